//! Selection of the voted voters and of the percentage shown in a polling status report.
//!
//! The two modes do not share a denominator. The all-voters report divides by
//! the ward total of the statistics, while the LDF report divides by the sum
//! of the LDF totals of the level 2 volunteers ("Thara" secretaries).

use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::*;
use crate::fields::DivisionScheme;
use crate::services::{ReportSink, StatsSource, VoterDirectory};
use crate::session::Capabilities;

/// Page size used while collecting the voted voters.
pub const EXPORT_PAGE_SIZE: u32 = 100;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    AllVoters,
    LdfOnly,
}

#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Voted voters in the report.
    pub numerator: u64,
    /// Voters the percentage is relative to.
    pub denominator: u64,
    pub percentage: f64,
}

/// Collects every voted voter, page after page.
///
/// A failure on any page aborts the whole collection.
pub fn fetch_voted(dir: &dyn VoterDirectory) -> Result<Vec<Voter>, FlowError> {
    let filters = VoterFilters {
        has_voted: Some(true),
        ..Default::default()
    };
    let mut voters: Vec<Voter> = Vec::new();
    let mut page = 1;
    loop {
        let query = VoterQuery::new(filters.clone())
            .with_page(page)
            .with_page_size(EXPORT_PAGE_SIZE);
        let res = dir.list(&query).map_err(|e| {
            warn!("fetch_voted: page {} failed: {}", page, e);
            FlowError::ExportFailed {
                reason: e.to_string(),
            }
        })?;
        voters.extend(res.results);
        match res.next {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }
    debug!("fetch_voted: {} voters over {} pages", voters.len(), page);
    Ok(voters)
}

/// The voters that end up in the report of this mode.
pub fn select(mode: ExportMode, voted: &[Voter]) -> Vec<&Voter> {
    voted
        .iter()
        .filter(|v| mode == ExportMode::AllVoters || v.party == Party::Ldf)
        .collect()
}

pub fn summarize(mode: ExportMode, voted: &[Voter], stats: &DashboardStats) -> ExportSummary {
    let numerator = select(mode, voted).len() as u64;
    let denominator = match mode {
        ExportMode::AllVoters => stats.total_voters,
        ExportMode::LdfOnly => stats
            .level2_volunteer_stats
            .iter()
            .map(|s| s.ldf_total)
            .sum(),
    };
    ExportSummary {
        numerator,
        denominator,
        percentage: percentage(numerator, denominator),
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub index: usize,
    pub serial_no: u32,
    pub name: String,
    /// The level 2 volunteer of the voter, or "-".
    pub thara: String,
    pub time_voted: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated: String,
    pub mode: ExportMode,
    pub language: Language,
    pub total_label: String,
    pub summary: ExportSummary,
    pub headers: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub file_name: String,
}

/// What a report is about, and for whom.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub mode: ExportMode,
    pub language: Language,
    pub ward_name: &'a str,
    pub scheme: DivisionScheme,
    pub now: DateTime<Local>,
}

fn title(req: &ExportRequest, caps: &Capabilities) -> String {
    let subject = match req.mode {
        ExportMode::AllVoters => None,
        ExportMode::LdfOnly if caps.can_see_party_names => Some("LDF".to_string()),
        ExportMode::LdfOnly => Some(req.scheme.label(Party::Ldf)),
    };
    let report = match req.language {
        Language::En => "Voting Status Report",
        Language::Ml => "വോട്ടിംഗ് സ്റ്റാറ്റസ് റിപ്പോർട്ട്",
    };
    match subject {
        Some(s) => format!("{} - {} {}", req.ward_name, s, report),
        None => format!("{} - {}", req.ward_name, report),
    }
}

fn file_name(req: &ExportRequest) -> String {
    let ward: String = req.ward_name.split_whitespace().collect();
    let stamp = req.now.with_timezone(&Utc).format("%Y%m%d_%H%M%S");
    match req.mode {
        ExportMode::AllVoters => format!("{}_PollingStatus_{}.json", ward, stamp),
        ExportMode::LdfOnly => format!("{}_PollingStatus_LDF_{}.json", ward, stamp),
    }
}

/// Lays out the report. Only the data is decided here, not its rendering.
pub fn build_report(
    caps: &Capabilities,
    req: &ExportRequest,
    voted: &[Voter],
    stats: &DashboardStats,
) -> Report {
    let summary = summarize(req.mode, voted, stats);
    let rows = select(req.mode, voted)
        .into_iter()
        .enumerate()
        .map(|(i, v)| ReportRow {
            index: i + 1,
            serial_no: v.serial_no,
            name: v.name(req.language).to_string(),
            thara: v
                .level2_volunteer
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            time_voted: v.time_voted.map_or_else(
                || "-".to_string(),
                |t| t.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string(),
            ),
        })
        .collect();
    let headers: &[&str] = match req.language {
        Language::En => &["#", "Sl. No.", "Name", "Thara", "Voted Time"],
        Language::Ml => &["#", "ക്രമ നം", "പേര്", "താര", "സമയം"],
    };
    let total_label = match req.mode {
        ExportMode::AllVoters => "Total Voters".to_string(),
        ExportMode::LdfOnly if caps.can_see_party_names => "Total LDF Voters".to_string(),
        ExportMode::LdfOnly => format!("Total {} Voters", req.scheme.label(Party::Ldf)),
    };
    Report {
        title: title(req, caps),
        generated: req.now.format("%d %b %Y, %H:%M").to_string(),
        mode: req.mode,
        language: req.language,
        total_label,
        summary,
        headers: headers.iter().map(|s| s.to_string()).collect(),
        rows,
        file_name: file_name(req),
    }
}

/// Runs a whole export: collect, summarize, lay out and hand over to the sink.
///
/// Nothing reaches the sink unless every step succeeded.
pub fn export(
    dir: &dyn VoterDirectory,
    stats: &dyn StatsSource,
    sink: &mut dyn ReportSink,
    caps: &Capabilities,
    req: &ExportRequest,
) -> Result<Report, FlowError> {
    let voted = fetch_voted(dir)?;
    let snapshot = stats
        .dashboard_stats()
        .map_err(|e| FlowError::ExportFailed {
            reason: e.to_string(),
        })?;
    let report = build_report(caps, req, &voted, &snapshot);
    sink.deliver(&report)
        .map_err(|e| FlowError::ExportFailed {
            reason: e.to_string(),
        })?;
    info!(
        "export: {} ({} / {} = {}%)",
        report.file_name,
        report.summary.numerator,
        report.summary.denominator,
        report.summary.percentage
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::testing::*;
    use chrono::TimeZone;

    #[derive(Default)]
    struct Collect {
        reports: Vec<Report>,
    }

    impl ReportSink for Collect {
        fn deliver(&mut self, report: &Report) -> Result<(), ServiceError> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    fn thara(ldf_total: u64) -> VolunteerStats {
        VolunteerStats {
            ldf_total,
            ..Default::default()
        }
    }

    fn request(mode: ExportMode) -> ExportRequest<'static> {
        ExportRequest {
            mode,
            language: Language::En,
            ward_name: "Ward 14",
            scheme: DivisionScheme::Sequential,
            now: Local.with_ymd_and_hms(2025, 12, 9, 18, 0, 0).unwrap(),
        }
    }

    #[test]
    fn ldf_denominator_sums_the_thara_totals() {
        let mut voted_voters: Vec<Voter> = (1..=55).map(|i| voted(i, i, Party::Ldf)).collect();
        voted_voters.extend((56..=70).map(|i| voted(i, i, Party::Udf)));
        let stats = DashboardStats {
            total_voters: 500,
            level2_volunteer_stats: vec![thara(40), thara(60)],
            ..Default::default()
        };
        let ldf = summarize(ExportMode::LdfOnly, &voted_voters, &stats);
        assert_eq!(ldf.numerator, 55);
        assert_eq!(ldf.denominator, 100);
        assert_eq!(ldf.percentage, 55.0);
        let all = summarize(ExportMode::AllVoters, &voted_voters, &stats);
        assert_eq!(all.numerator, 70);
        assert_eq!(all.denominator, 500);
        assert_eq!(all.percentage, 14.0);
    }

    #[test]
    fn empty_denominator_gives_zero() {
        let s = summarize(
            ExportMode::LdfOnly,
            &[voted(1, 1, Party::Ldf)],
            &DashboardStats::default(),
        );
        assert_eq!(s.denominator, 0);
        assert_eq!(s.percentage, 0.0);
    }

    #[test]
    fn collects_every_page() {
        let mut voters: Vec<Voter> = (1..=250).map(|i| voted(i, i, Party::Ldf)).collect();
        voters.push(voter(251, 251));
        let dir = MemoryDirectory::new(voters);
        let all = fetch_voted(&dir).unwrap();
        assert_eq!(all.len(), 250);
        assert_eq!(dir.list_calls(), 3);
    }

    #[test]
    fn a_failing_page_aborts_the_export() {
        let voters: Vec<Voter> = (1..=250).map(|i| voted(i, i, Party::Ldf)).collect();
        let mut dir = MemoryDirectory::new(voters);
        dir.fail_list_call(2);
        let mut sink = Collect::default();
        let caps = Capabilities::resolve(&admin_user());
        let res = export(&dir, &dir, &mut sink, &caps, &request(ExportMode::AllVoters));
        assert!(matches!(res, Err(FlowError::ExportFailed { .. })));
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn repeated_exports_agree() {
        let mut voters: Vec<Voter> = (1..=30).map(|i| voted(i, i, Party::Ldf)).collect();
        voters.extend((31..=60).map(|i| voter(i, i)));
        for v in voters.iter_mut() {
            v.level2_volunteer = Some(1);
        }
        let dir = MemoryDirectory::new(voters)
            .with_volunteers(vec![volunteer(1, VolunteerLevel::Level2)]);
        let caps = Capabilities::resolve(&admin_user());
        let mut sink = Collect::default();
        let req = request(ExportMode::LdfOnly);
        let first = export(&dir, &dir, &mut sink, &caps, &req).unwrap();
        let second = export(&dir, &dir, &mut sink, &caps, &req).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.summary.denominator, 30);
        assert_eq!(first.summary.percentage, 100.0);
        assert_eq!(dir.update_calls(), 0);
        assert_eq!(sink.reports.len(), 2);
    }

    #[test]
    fn report_layout() {
        let mut v = voted(1, 17, Party::Ldf);
        v.level2_volunteer = Some(3);
        let voters = vec![v, voted(2, 18, Party::Bjp)];
        let admin = Capabilities::resolve(&admin_user());
        let overview = Capabilities::resolve(&overview_user());
        let req = request(ExportMode::LdfOnly);
        let stats = DashboardStats::default();

        let report = build_report(&admin, &req, &voters, &stats);
        assert_eq!(report.title, "Ward 14 - LDF Voting Status Report");
        assert!(report.file_name.starts_with("Ward14_PollingStatus_LDF_"));
        assert!(report.file_name.ends_with(".json"));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].thara, "3");
        assert_eq!(report.rows[0].time_voted, "-");

        let report = build_report(&overview, &req, &voters, &stats);
        assert_eq!(report.title, "Ward 14 - Division A Voting Status Report");
        assert_eq!(report.total_label, "Total Division A Voters");

        let all = build_report(&admin, &request(ExportMode::AllVoters), &voters, &stats);
        assert_eq!(all.rows.len(), 2);
        assert_eq!(all.rows[1].index, 2);
        assert_eq!(all.rows[1].thara, "-");
    }
}
