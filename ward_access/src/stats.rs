//! Dashboard statistics over a whole ward.

use std::collections::BTreeMap;

use log::debug;

use crate::config::*;
use crate::messages;

#[derive(Default)]
struct Tally {
    total: u64,
    voted: u64,
    ldf_total: u64,
    ldf_voted: u64,
    ldf_male_voted: u64,
    ldf_female_voted: u64,
}

impl Tally {
    fn add(&mut self, v: &Voter) {
        self.total += 1;
        if v.has_voted {
            self.voted += 1;
        }
        if v.party == Party::Ldf {
            self.ldf_total += 1;
            if v.has_voted {
                self.ldf_voted += 1;
                match v.gender {
                    Some(Gender::Male) => self.ldf_male_voted += 1,
                    Some(Gender::Female) => self.ldf_female_voted += 1,
                    _ => {}
                }
            }
        }
    }

    fn into_stats(self, volunteer: &Volunteer) -> VolunteerStats {
        VolunteerStats {
            id: volunteer.id,
            name: volunteer.name.clone(),
            total_voters: self.total,
            voted_count: self.voted,
            not_voted_count: self.total - self.voted,
            voting_percentage: percentage(self.voted, self.total),
            ldf_total: self.ldf_total,
            ldf_voted: self.ldf_voted,
            ldf_percentage: percentage(self.ldf_voted, self.ldf_total),
            ldf_male_voted: self.ldf_male_voted,
            ldf_female_voted: self.ldf_female_voted,
        }
    }
}

fn volunteer_stats<F>(
    voters: &[Voter],
    volunteers: &[Volunteer],
    level: VolunteerLevel,
    assigned: F,
) -> Vec<VolunteerStats>
where
    F: Fn(&Voter) -> Option<u32>,
{
    let mut selected: Vec<&Volunteer> = volunteers
        .iter()
        .filter(|v| v.level == level && v.is_active)
        .collect();
    selected.sort_by_key(|v| v.volunteer_id);
    selected
        .into_iter()
        .map(|vol| {
            let mut tally = Tally::default();
            voters
                .iter()
                .filter(|v| v.status != VoterStatus::Deleted && assigned(*v) == Some(vol.id))
                .for_each(|v| tally.add(v));
            tally.into_stats(vol)
        })
        .collect()
}

/// Computes the dashboard statistics.
///
/// Deleted voters are left out of the totals and of the per-volunteer figures.
/// The per-party counts cover every voter that has voted.
pub fn compute_stats(voters: &[Voter], volunteers: &[Volunteer]) -> DashboardStats {
    let live: Vec<&Voter> = voters
        .iter()
        .filter(|v| v.status != VoterStatus::Deleted)
        .collect();
    let total_voters = live.len() as u64;
    let voted = || live.iter().filter(|v| v.has_voted);
    let voted_count = voted().count() as u64;
    let male_voted = voted().filter(|v| v.gender == Some(Gender::Male)).count() as u64;
    let female_voted = voted().filter(|v| v.gender == Some(Gender::Female)).count() as u64;

    let party_stats: BTreeMap<Party, PartyStat> = Party::ALL
        .iter()
        .map(|p| {
            let voted_count = voters
                .iter()
                .filter(|v| v.has_voted && v.party == *p)
                .count() as u64;
            let name = messages::party_label(*p, Language::En).to_string();
            (*p, PartyStat { name, voted_count })
        })
        .collect();

    let status_stats: BTreeMap<VoterStatus, StatusStat> = VoterStatus::KNOWN
        .iter()
        .filter(|s| **s != VoterStatus::Deleted)
        .map(|s| {
            let count = voters.iter().filter(|v| v.status == *s).count() as u64;
            let name = messages::status_label(s, Language::En);
            (s.clone(), StatusStat { name, count })
        })
        .collect();

    let stats = DashboardStats {
        total_voters,
        voted_count,
        not_voted_count: total_voters - voted_count,
        voting_percentage: percentage(voted_count, total_voters),
        male_voted,
        female_voted,
        party_stats,
        status_stats,
        level1_volunteer_stats: volunteer_stats(
            voters,
            volunteers,
            VolunteerLevel::Level1,
            |v| v.level1_volunteer,
        ),
        level2_volunteer_stats: volunteer_stats(
            voters,
            volunteers,
            VolunteerLevel::Level2,
            |v| v.level2_volunteer,
        ),
    };
    debug!(
        "compute_stats: total: {} voted: {} ({}%)",
        stats.total_voters, stats.voted_count, stats.voting_percentage
    );
    stats
}
