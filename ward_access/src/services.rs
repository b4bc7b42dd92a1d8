//! The collaborators consumed by the access core.
//!
//! They stand for the remote API and the durable storage of the dashboard.
//! The core only talks to them through these traits; reference implementations
//! live in [`crate::directory`] and in this module ([`MemoryStore`]).

use std::collections::HashMap;

use crate::config::*;
use crate::export::Report;

/// Login, logout and access to the current user.
pub trait Authenticator {
    /// The current user, or `None` when nobody is logged in.
    fn current_user(&self) -> Result<Option<User>, ServiceError>;

    fn login(&mut self, username: &str, password: &str) -> Result<User, ServiceError>;

    fn logout(&mut self) -> Result<(), ServiceError>;
}

pub trait VoterDirectory {
    fn list(&self, query: &VoterQuery) -> Result<VoterPage, ServiceError>;

    fn get(&self, id: u32) -> Result<Voter, ServiceError>;

    /// Applies a partial update and returns the updated voter.
    fn update(&mut self, id: u32, update: &VoterUpdate) -> Result<Voter, ServiceError>;
}

pub trait VolunteerDirectory {
    fn volunteers(&self, level: Option<VolunteerLevel>) -> Result<Vec<Volunteer>, ServiceError>;

    fn volunteer(&self, id: u32) -> Result<Volunteer, ServiceError>;

    /// All the voters under a volunteer, optionally filtered on the voted flag.
    fn volunteer_voters(&self, id: u32, has_voted: Option<bool>)
        -> Result<Vec<Voter>, ServiceError>;
}

pub trait SettingsSource {
    fn settings(&self) -> Result<AppSettings, ServiceError>;
}

pub trait StatsSource {
    fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError>;
}

/// Receives finished reports (writes them out, offers them for download...).
pub trait ReportSink {
    fn deliver(&mut self, report: &Report) -> Result<(), ServiceError>;
}

/// Durable key-value storage, local to the operator's machine and never synced.
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), ServiceError>;

    fn remove(&mut self, key: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ServiceError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ServiceError> {
        self.values.remove(key);
        Ok(())
    }
}
