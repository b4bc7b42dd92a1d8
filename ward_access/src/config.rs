// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// The role attached to an authenticated account.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Read-only supervisor access to the whole ward.
    Overview,
    Volunteer,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerLevel {
    /// Bottom level volunteer, read-only on their own voters.
    Level1,
    /// Supervisor ("Thara" secretary), may edit their voters.
    Level2,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerProfile {
    pub id: u32,
    pub volunteer_id: u32,
    pub name: String,
    pub level: VolunteerLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_volunteer: Option<u32>,
}

/// An authenticated user, as returned by the authentication collaborator.
///
/// It is immutable for the lifetime of a session.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub volunteer: Option<VolunteerProfile>,
}

/// The registration status of a voter.
///
/// Codes that are not known to this crate are preserved in `Other`.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoterStatus {
    Active,
    OutOfStation,
    Deceased,
    PostalVote,
    Deleted,
    Other(String),
}

impl VoterStatus {
    pub const KNOWN: [VoterStatus; 5] = [
        VoterStatus::Active,
        VoterStatus::OutOfStation,
        VoterStatus::Deceased,
        VoterStatus::PostalVote,
        VoterStatus::Deleted,
    ];

    pub fn code(&self) -> &str {
        match self {
            VoterStatus::Active => "active",
            VoterStatus::OutOfStation => "out_of_station",
            VoterStatus::Deceased => "deceased",
            VoterStatus::PostalVote => "postal_vote",
            VoterStatus::Deleted => "deleted",
            VoterStatus::Other(s) => s.as_str(),
        }
    }
}

impl Default for VoterStatus {
    fn default() -> Self {
        VoterStatus::Active
    }
}

impl From<String> for VoterStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => VoterStatus::Active,
            "out_of_station" => VoterStatus::OutOfStation,
            "deceased" => VoterStatus::Deceased,
            "postal_vote" => VoterStatus::PostalVote,
            "deleted" => VoterStatus::Deleted,
            _ => VoterStatus::Other(s),
        }
    }
}

impl From<VoterStatus> for String {
    fn from(s: VoterStatus) -> Self {
        s.code().to_string()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Ldf,
    Udf,
    Bjp,
    Other,
    Unknown,
}

impl Party {
    pub const ALL: [Party; 5] = [Party::Ldf, Party::Udf, Party::Bjp, Party::Other, Party::Unknown];

    pub fn code(&self) -> &'static str {
        match self {
            Party::Ldf => "ldf",
            Party::Udf => "udf",
            Party::Bjp => "bjp",
            Party::Other => "other",
            Party::Unknown => "unknown",
        }
    }

    pub fn from_code(s: &str) -> Option<Party> {
        Party::ALL
            .iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .copied()
    }
}

impl Default for Party {
    fn default() -> Self {
        Party::Unknown
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ml,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ml => "ml",
        }
    }

    pub fn from_code(s: &str) -> Option<Language> {
        match s.trim() {
            "en" => Some(Language::En),
            "ml" => Some(Language::Ml),
            _ => None,
        }
    }
}

/// Picks the text to show for a bilingual field.
///
/// The Malayalam view uses the Malayalam text when it is present and not empty,
/// and falls back to the English text otherwise.
pub fn localized<'a>(lang: Language, en: &'a str, ml: Option<&'a str>) -> &'a str {
    match (lang, ml) {
        (Language::Ml, Some(s)) if !s.trim().is_empty() => s,
        _ => en,
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    pub id: u32,
    pub serial_no: u32,
    /// Identity card number of the State Election Commission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sec_id: Option<String>,
    pub name_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ml: Option<String>,
    #[serde(default)]
    pub house_name_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_name_ml: Option<String>,
    #[serde(default)]
    pub status: VoterStatus,
    #[serde(default)]
    pub party: Party,
    #[serde(default)]
    pub has_voted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level1_volunteer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level2_volunteer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_voted: Option<DateTime<Utc>>,
}

impl Voter {
    pub fn name(&self, lang: Language) -> &str {
        localized(lang, &self.name_en, self.name_ml.as_deref())
    }

    pub fn house_name(&self, lang: Language) -> &str {
        localized(lang, &self.house_name_en, self.house_name_ml.as_deref())
    }

    pub fn snapshot(&self) -> VoterSnapshot {
        VoterSnapshot {
            id: self.id,
            serial_no: self.serial_no,
            name_en: self.name_en.clone(),
            name_ml: self.name_ml.clone(),
            house_name_en: self.house_name_en.clone(),
            house_name_ml: self.house_name_ml.clone(),
        }
    }
}

/// The identifying part of a voter, as copied into messages and the audit trail.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VoterSnapshot {
    pub id: u32,
    pub serial_no: u32,
    pub name_en: String,
    #[serde(default)]
    pub name_ml: Option<String>,
    #[serde(default)]
    pub house_name_en: String,
    #[serde(default)]
    pub house_name_ml: Option<String>,
}

impl VoterSnapshot {
    pub fn name(&self, lang: Language) -> &str {
        localized(lang, &self.name_en, self.name_ml.as_deref())
    }

    pub fn house_name(&self, lang: Language) -> &str {
        localized(lang, &self.house_name_en, self.house_name_ml.as_deref())
    }
}

/// One entry of the session audit trail kept by the quick data entry.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MarkedVoterRecord {
    #[serde(flatten)]
    pub voter: VoterSnapshot,
    pub timestamp: DateTime<Local>,
}

/// A partial update of a voter. Fields left to `None` are not sent.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VoterStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VoterUpdate {
    pub fn mark_voted() -> VoterUpdate {
        VoterUpdate {
            has_voted: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == VoterUpdate::default()
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoterFilters {
    pub search: Option<String>,
    pub has_voted: Option<bool>,
    pub party: Option<Party>,
    pub status: Option<VoterStatus>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterQuery {
    pub filters: VoterFilters,
    pub page: u32,
    pub page_size: u32,
}

impl VoterQuery {
    pub fn new(filters: VoterFilters) -> VoterQuery {
        VoterQuery {
            filters,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page(self, page: u32) -> VoterQuery {
        VoterQuery { page, ..self }
    }

    pub fn with_page_size(self, page_size: u32) -> VoterQuery {
        VoterQuery { page_size, ..self }
    }
}

/// One page of voters. `next` is the number of the following page, if any.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoterPage {
    pub results: Vec<Voter>,
    pub count: Option<u64>,
    pub next: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: u32,
    pub volunteer_id: u32,
    pub name: String,
    pub level: VolunteerLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_volunteer: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub voting_enabled: bool,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyStat {
    pub name: String,
    pub voted_count: u64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusStat {
    pub name: String,
    pub count: u64,
}

/// Statistics for the voters under one volunteer.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolunteerStats {
    pub id: u32,
    pub name: String,
    pub total_voters: u64,
    pub voted_count: u64,
    pub not_voted_count: u64,
    pub voting_percentage: f64,
    pub ldf_total: u64,
    pub ldf_voted: u64,
    pub ldf_percentage: f64,
    #[serde(default)]
    pub ldf_male_voted: u64,
    #[serde(default)]
    pub ldf_female_voted: u64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_voters: u64,
    pub voted_count: u64,
    pub not_voted_count: u64,
    pub voting_percentage: f64,
    #[serde(default)]
    pub male_voted: u64,
    #[serde(default)]
    pub female_voted: u64,
    #[serde(default)]
    pub party_stats: std::collections::BTreeMap<Party, PartyStat>,
    #[serde(default)]
    pub status_stats: std::collections::BTreeMap<VoterStatus, StatusStat>,
    #[serde(default)]
    pub level1_volunteer_stats: Vec<VolunteerStats>,
    #[serde(default)]
    pub level2_volunteer_stats: Vec<VolunteerStats>,
}

/// `numerator / denominator * 100` rounded to 2 decimals, or 0 when there is nothing to divide by.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let p = (numerator as f64) / (denominator as f64) * 100.0;
    (p * 100.0).round() / 100.0
}

// ********* Errors **********

/// Failures reported by the collaborators (authentication, directories, storage).
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ServiceError {
    Unauthenticated,
    Forbidden,
    NotFound,
    Unavailable(String),
    Storage(String),
}

impl Error for ServiceError {}

impl Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Unauthenticated => write!(f, "not authenticated"),
            ServiceError::Forbidden => write!(f, "forbidden"),
            ServiceError::NotFound => write!(f, "not found"),
            ServiceError::Unavailable(msg) => write!(f, "service unavailable: {}", msg),
            ServiceError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

/// Errors surfaced to the operator by the workflows.
///
/// None of them end the session: they are shown once and cleared by the next action.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FlowError {
    /// No voter carries the submitted serial number.
    NotFound { serial: String },
    /// The voter is already marked as voted.
    AlreadyProcessed { voter: VoterSnapshot },
    /// The voter status does not allow marking.
    IneligibleStatus {
        voter: VoterSnapshot,
        status: VoterStatus,
    },
    /// Voting is disabled in the settings.
    FeatureDisabled,
    UpdateFailed {
        voter: VoterSnapshot,
        reason: ServiceError,
    },
    LoadFailed { reason: ServiceError },
    ExportFailed { reason: String },
}

impl Error for FlowError {}

impl Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::messages::describe(self, Language::En))
    }
}

/// Reasons for refusing a voter edit.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum EditRejection {
    ReadOnly,
    VotingDisabled,
    NothingToUpdate,
}

impl Error for EditRejection {}

impl Display for EditRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditRejection::ReadOnly => write!(f, "this account has read-only access"),
            EditRejection::VotingDisabled => {
                write!(f, "voting is currently disabled, the voted flag cannot change")
            }
            EditRejection::NothingToUpdate => write!(f, "no field to update"),
        }
    }
}
