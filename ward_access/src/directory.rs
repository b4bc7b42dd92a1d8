//! An in-memory ward: voters, volunteers and settings behind the collaborator traits.
//!
//! The directory applies the same visibility rules as the remote API: a level 1
//! volunteer only sees the voters assigned to them, a level 2 volunteer the voters
//! of their group, and read-only accounts cannot update anything.

use std::cell::Cell;

use chrono::Utc;
use log::{debug, info};

use crate::config::*;
use crate::services::*;
use crate::session::Capabilities;
use crate::stats::compute_stats;

/// Which voters the current viewer may see.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VoterScope {
    All,
    /// Voters assigned to this level 1 volunteer (by volunteer record id).
    Level1(u32),
    /// Voters assigned to this level 2 volunteer (by volunteer record id).
    Level2(u32),
}

impl VoterScope {
    fn contains(&self, v: &Voter) -> bool {
        match self {
            VoterScope::All => true,
            VoterScope::Level1(id) => v.level1_volunteer == Some(*id),
            VoterScope::Level2(id) => v.level2_volunteer == Some(*id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    voters: Vec<Voter>,
    volunteers: Vec<Volunteer>,
    settings: AppSettings,
    scope: VoterScope,
    read_only: bool,
    list_calls: Cell<usize>,
    update_calls: usize,
    // 1-based index of the list call that should fail, if any.
    failing_list_call: Option<usize>,
    failing_updates: bool,
}

impl MemoryDirectory {
    pub fn new(voters: Vec<Voter>) -> MemoryDirectory {
        let mut voters = voters;
        voters.sort_by_key(|v| v.serial_no);
        MemoryDirectory {
            voters,
            volunteers: Vec::new(),
            settings: AppSettings::default(),
            scope: VoterScope::All,
            read_only: false,
            list_calls: Cell::new(0),
            update_calls: 0,
            failing_list_call: None,
            failing_updates: false,
        }
    }

    pub fn with_volunteers(self, volunteers: Vec<Volunteer>) -> MemoryDirectory {
        MemoryDirectory { volunteers, ..self }
    }

    pub fn with_settings(self, settings: AppSettings) -> MemoryDirectory {
        MemoryDirectory { settings, ..self }
    }

    /// Restricts what the directory returns to what this viewer may see.
    pub fn set_viewer(&mut self, caps: &Capabilities) {
        self.scope = match (caps.is_level1, caps.is_level2, caps.volunteer_id) {
            (true, _, Some(id)) => VoterScope::Level1(id),
            (_, true, Some(id)) => VoterScope::Level2(id),
            _ => VoterScope::All,
        };
        self.read_only = caps.is_read_only;
        debug!(
            "set_viewer: scope: {:?} read_only: {:?}",
            self.scope, self.read_only
        );
    }

    pub fn set_voting_enabled(&mut self, enabled: bool) {
        self.settings.voting_enabled = enabled;
    }

    /// Makes the n-th call to `list` (starting at 1) fail.
    pub fn fail_list_call(&mut self, n: usize) {
        self.failing_list_call = Some(n);
    }

    pub fn fail_updates(&mut self, failing: bool) {
        self.failing_updates = failing;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls
    }

    pub fn all_voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn all_volunteers(&self) -> &[Volunteer] {
        &self.volunteers
    }

    pub fn voter_by_serial(&self, serial_no: u32) -> Option<&Voter> {
        self.voters.iter().find(|v| v.serial_no == serial_no)
    }

    fn matches(v: &Voter, filters: &VoterFilters) -> bool {
        if let Some(search) = filters.search.as_deref() {
            let needle = search.trim().to_lowercase();
            let haystacks = [
                Some(v.name_en.as_str()),
                v.name_ml.as_deref(),
                Some(v.house_name_en.as_str()),
                v.house_name_ml.as_deref(),
            ];
            let in_text = haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle));
            if !in_text && !v.serial_no.to_string().contains(&needle) {
                return false;
            }
        }
        if matches!(filters.has_voted, Some(x) if x != v.has_voted) {
            return false;
        }
        if matches!(filters.party, Some(p) if p != v.party) {
            return false;
        }
        if matches!(&filters.status, Some(s) if *s != v.status) {
            return false;
        }
        true
    }
}

impl VoterDirectory for MemoryDirectory {
    fn list(&self, query: &VoterQuery) -> Result<VoterPage, ServiceError> {
        let call = self.list_calls.get() + 1;
        self.list_calls.set(call);
        if self.failing_list_call == Some(call) {
            return Err(ServiceError::Unavailable(format!("list call {} failed", call)));
        }
        let selected: Vec<&Voter> = self
            .voters
            .iter()
            .filter(|v| self.scope.contains(v))
            .filter(|v| Self::matches(v, &query.filters))
            .collect();
        let total = selected.len();
        let page_size = query.page_size.max(1) as usize;
        let page = query.page.max(1) as usize;
        let start = (page - 1) * page_size;
        let results: Vec<Voter> = selected
            .iter()
            .skip(start)
            .take(page_size)
            .map(|v| (*v).clone())
            .collect();
        let next = if start + page_size < total {
            Some(page as u32 + 1)
        } else {
            None
        };
        debug!(
            "list: query: {:?} total: {:?} returned: {:?} next: {:?}",
            query,
            total,
            results.len(),
            next
        );
        Ok(VoterPage {
            results,
            count: Some(total as u64),
            next,
        })
    }

    fn get(&self, id: u32) -> Result<Voter, ServiceError> {
        self.voters
            .iter()
            .find(|v| v.id == id && self.scope.contains(v))
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    fn update(&mut self, id: u32, update: &VoterUpdate) -> Result<Voter, ServiceError> {
        self.update_calls += 1;
        if self.failing_updates {
            return Err(ServiceError::Unavailable("update rejected".to_string()));
        }
        if self.read_only {
            return Err(ServiceError::Forbidden);
        }
        let scope = self.scope;
        let voter = self
            .voters
            .iter_mut()
            .find(|v| v.id == id && scope.contains(v))
            .ok_or(ServiceError::NotFound)?;
        if let Some(status) = &update.status {
            voter.status = status.clone();
        }
        if let Some(party) = update.party {
            voter.party = party;
        }
        if let Some(has_voted) = update.has_voted {
            if has_voted && !voter.has_voted {
                voter.time_voted = Some(Utc::now());
            } else if !has_voted {
                voter.time_voted = None;
            }
            voter.has_voted = has_voted;
        }
        if let Some(phone) = &update.phone_number {
            voter.phone_number = Some(phone.clone()).filter(|s| !s.is_empty());
        }
        if let Some(notes) = &update.notes {
            voter.notes = Some(notes.clone()).filter(|s| !s.is_empty());
        }
        info!("update: voter {} (serial {}): {:?}", id, voter.serial_no, update);
        Ok(voter.clone())
    }
}

impl VolunteerDirectory for MemoryDirectory {
    fn volunteers(&self, level: Option<VolunteerLevel>) -> Result<Vec<Volunteer>, ServiceError> {
        let mut res: Vec<Volunteer> = self
            .volunteers
            .iter()
            .filter(|v| level.map_or(true, |l| l == v.level))
            .cloned()
            .collect();
        res.sort_by_key(|v| v.volunteer_id);
        Ok(res)
    }

    fn volunteer(&self, id: u32) -> Result<Volunteer, ServiceError> {
        self.volunteers
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    fn volunteer_voters(
        &self,
        id: u32,
        has_voted: Option<bool>,
    ) -> Result<Vec<Voter>, ServiceError> {
        let volunteer = self.volunteer(id)?;
        let scope = match volunteer.level {
            VolunteerLevel::Level1 => VoterScope::Level1(volunteer.id),
            VolunteerLevel::Level2 => VoterScope::Level2(volunteer.id),
        };
        Ok(self
            .voters
            .iter()
            .filter(|v| scope.contains(v))
            .filter(|v| has_voted.map_or(true, |x| x == v.has_voted))
            .cloned()
            .collect())
    }
}

impl SettingsSource for MemoryDirectory {
    fn settings(&self) -> Result<AppSettings, ServiceError> {
        Ok(self.settings)
    }
}

impl StatsSource for MemoryDirectory {
    fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(compute_stats(&self.voters, &self.volunteers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn pages_through_the_voters_in_serial_order() {
        let dir = MemoryDirectory::new((1..=120).rev().map(|s| voter(s, s)).collect());
        let q = VoterQuery::new(VoterFilters::default());
        let p1 = dir.list(&q).unwrap();
        assert_eq!(p1.results.len(), 50);
        assert_eq!(p1.results[0].serial_no, 1);
        assert_eq!(p1.count, Some(120));
        assert_eq!(p1.next, Some(2));
        let p3 = dir.list(&q.with_page(3)).unwrap();
        assert_eq!(p3.results.len(), 20);
        assert_eq!(p3.next, None);
    }

    #[test]
    fn search_matches_names_and_serial_numbers() {
        let mut anna = voter(1, 12);
        anna.name_en = "Anna Joseph".to_string();
        let dir = MemoryDirectory::new(vec![anna, voter(2, 112), voter(3, 7)]);
        let by_serial = dir
            .list(&VoterQuery::new(VoterFilters {
                search: Some("12".to_string()),
                ..Default::default()
            }))
            .unwrap();
        let serials: Vec<u32> = by_serial.results.iter().map(|v| v.serial_no).collect();
        assert_eq!(serials, vec![12, 112]);
        let by_name = dir
            .list(&VoterQuery::new(VoterFilters {
                search: Some("joseph".to_string()),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(by_name.results.len(), 1);
    }

    #[test]
    fn level1_viewer_only_sees_assigned_voters_and_cannot_update() {
        let mut mine = voter(1, 1);
        mine.level1_volunteer = Some(7);
        let mut dir = MemoryDirectory::new(vec![mine, voter(2, 2)]);
        dir.set_viewer(&Capabilities::resolve(&level1_user(7)));
        let page = dir.list(&VoterQuery::new(VoterFilters::default())).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(dir.get(2), Err(ServiceError::NotFound));
        assert_eq!(
            dir.update(1, &VoterUpdate::mark_voted()),
            Err(ServiceError::Forbidden)
        );
    }

    #[test]
    fn marking_sets_and_clears_the_time_voted() {
        let mut dir = MemoryDirectory::new(vec![voter(1, 1)]);
        let v = dir.update(1, &VoterUpdate::mark_voted()).unwrap();
        assert!(v.has_voted);
        assert!(v.time_voted.is_some());
        let v = dir
            .update(
                1,
                &VoterUpdate {
                    has_voted: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!v.has_voted);
        assert_eq!(v.time_voted, None);
        assert_eq!(dir.update_calls(), 2);
    }
}
