//! Quick data entry: marking voters as voted by typing their serial number.
//!
//! Each submission is resolved completely before the next one can start: the
//! workflow holds the voter directory mutably for the whole of [`DataEntry::submit`].
//! A voter is only ever updated when it exists, is active and has not voted
//! yet, and only with `{has_voted: true}`. Every successful marking is recorded
//! at the head of an audit trail persisted in the local store.

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::config::*;
use crate::messages;
use crate::services::{LocalStore, SettingsSource, VoterDirectory};

/// The store key of the audit trail.
pub const MARKED_VOTERS_KEY: &str = "data_entry_marked_voters";

/// Page size of the serial number lookup.
pub const SEARCH_PAGE_SIZE: u32 = 100;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EntryState {
    Idle,
    Searching,
    /// The voter exists but cannot be marked.
    FoundIneligible,
    Committing,
    Committed,
    Failed,
}

/// The voters marked through this workflow, most recent first.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuditTrail {
    records: Vec<MarkedVoterRecord>,
}

impl AuditTrail {
    /// Reads the trail from the store. A missing or unreadable value gives an empty trail.
    pub fn load(store: &dyn LocalStore) -> AuditTrail {
        let records = match store.get(MARKED_VOTERS_KEY) {
            None => Vec::new(),
            Some(s) => match serde_json::from_str::<Vec<MarkedVoterRecord>>(&s) {
                Ok(records) => records,
                Err(e) => {
                    warn!("load: ignoring unreadable audit trail: {}", e);
                    Vec::new()
                }
            },
        };
        debug!("load: {} marked voters", records.len());
        AuditTrail { records }
    }

    pub fn records(&self) -> &[MarkedVoterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prepends a record and writes the trail back.
    ///
    /// The record stays in memory even if the store refuses the write.
    pub fn record(
        &mut self,
        record: MarkedVoterRecord,
        store: &mut dyn LocalStore,
    ) -> Result<(), ServiceError> {
        self.records.insert(0, record);
        self.persist(store)
    }

    // An empty trail is never written, so it never clears the stored one.
    fn persist(&self, store: &mut dyn LocalStore) -> Result<(), ServiceError> {
        if self.records.is_empty() {
            return Ok(());
        }
        let s = serde_json::to_string(&self.records)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        store.set(MARKED_VOTERS_KEY, s)
    }
}

/// The outcome of one submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Submission {
    /// Blank input: nothing happened.
    Ignored,
    Marked(MarkedVoterRecord),
    Rejected(FlowError),
}

impl Submission {
    /// The message to show to the operator, if any.
    pub fn message(&self, lang: Language) -> Option<String> {
        match self {
            Submission::Ignored => None,
            Submission::Marked(record) => Some(messages::marked(&record.voter, lang)),
            Submission::Rejected(err) => Some(messages::describe(err, lang)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataEntry {
    state: EntryState,
    input: String,
    voting_enabled: bool,
    focus_requested: bool,
    trail: AuditTrail,
}

impl DataEntry {
    /// Loads the voting flag and the audit trail.
    ///
    /// The flag defaults to enabled when the settings cannot be read.
    pub fn new(settings: &dyn SettingsSource, store: &dyn LocalStore) -> DataEntry {
        let voting_enabled = match settings.settings() {
            Ok(s) => s.voting_enabled,
            Err(e) => {
                warn!("new: could not read the settings, assuming voting is enabled: {}", e);
                true
            }
        };
        DataEntry {
            state: EntryState::Idle,
            input: String::new(),
            voting_enabled,
            focus_requested: true,
            trail: AuditTrail::load(store),
        }
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn voting_enabled(&self) -> bool {
        self.voting_enabled
    }

    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }

    /// Returns true once after every outcome that hands the input back to the operator.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::replace(&mut self.focus_requested, false)
    }

    fn transition(&mut self, state: EntryState) {
        debug!("transition: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    // Terminal outcome that clears the input for the next serial number.
    fn settle(&mut self, state: EntryState, outcome: Submission) -> Submission {
        self.transition(state);
        self.input.clear();
        self.focus_requested = true;
        outcome
    }

    /// Submits the current input.
    pub fn submit(
        &mut self,
        dir: &mut dyn VoterDirectory,
        store: &mut dyn LocalStore,
    ) -> Submission {
        self.submit_at(dir, store, Local::now())
    }

    pub fn submit_at(
        &mut self,
        dir: &mut dyn VoterDirectory,
        store: &mut dyn LocalStore,
        now: DateTime<Local>,
    ) -> Submission {
        let serial = self.input.trim().to_string();
        if serial.is_empty() {
            return Submission::Ignored;
        }
        if !self.voting_enabled {
            self.transition(EntryState::Idle);
            return Submission::Rejected(FlowError::FeatureDisabled);
        }

        let not_found = FlowError::NotFound {
            serial: serial.clone(),
        };
        let serial_no = match serial.parse::<u32>() {
            Ok(x) => x,
            Err(_) => {
                return self.settle(EntryState::Failed, Submission::Rejected(not_found));
            }
        };

        self.transition(EntryState::Searching);
        let query = VoterQuery::new(VoterFilters {
            search: Some(serial.clone()),
            ..Default::default()
        })
        .with_page_size(SEARCH_PAGE_SIZE);
        let page = match dir.list(&query) {
            Ok(page) => page,
            Err(reason) => {
                warn!("submit: search for {:?} failed: {}", serial, reason);
                let err = FlowError::LoadFailed { reason };
                return self.settle(EntryState::Failed, Submission::Rejected(err));
            }
        };
        let voter = match page.results.into_iter().find(|v| v.serial_no == serial_no) {
            Some(v) => v,
            None => {
                return self.settle(EntryState::Failed, Submission::Rejected(not_found));
            }
        };

        if voter.has_voted {
            let err = FlowError::AlreadyProcessed {
                voter: voter.snapshot(),
            };
            return self.settle(EntryState::FoundIneligible, Submission::Rejected(err));
        }
        if voter.status != VoterStatus::Active {
            let err = FlowError::IneligibleStatus {
                voter: voter.snapshot(),
                status: voter.status.clone(),
            };
            return self.settle(EntryState::FoundIneligible, Submission::Rejected(err));
        }

        self.transition(EntryState::Committing);
        if let Err(reason) = dir.update(voter.id, &VoterUpdate::mark_voted()) {
            warn!("submit: marking voter {} failed: {}", voter.id, reason);
            let err = FlowError::UpdateFailed {
                voter: voter.snapshot(),
                reason,
            };
            return self.settle(EntryState::Failed, Submission::Rejected(err));
        }

        let record = MarkedVoterRecord {
            voter: voter.snapshot(),
            timestamp: now,
        };
        if let Err(e) = self.trail.record(record.clone(), store) {
            warn!("submit: could not persist the audit trail: {}", e);
        }
        info!(
            "submit: marked voter {} (serial {}) as voted",
            voter.id, voter.serial_no
        );
        self.settle(EntryState::Committed, Submission::Marked(record))
    }
}
