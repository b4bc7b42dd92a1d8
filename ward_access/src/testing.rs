// Fixtures shared by the unit tests.

use crate::config::*;
use crate::services::Authenticator;

pub fn voter(id: u32, serial_no: u32) -> Voter {
    Voter {
        id,
        serial_no,
        sec_id: None,
        name_en: format!("Voter {}", serial_no),
        name_ml: None,
        house_name_en: format!("House {}", serial_no),
        house_name_ml: None,
        status: VoterStatus::Active,
        party: Party::Unknown,
        has_voted: false,
        phone_number: None,
        notes: None,
        level1_volunteer: None,
        level2_volunteer: None,
        gender: None,
        age: None,
        time_voted: None,
    }
}

pub fn voted(id: u32, serial_no: u32, party: Party) -> Voter {
    Voter {
        has_voted: true,
        party,
        ..voter(id, serial_no)
    }
}

fn user(id: u32, username: &str, role: Role, volunteer: Option<VolunteerProfile>) -> User {
    User {
        id,
        username: username.to_string(),
        role,
        volunteer,
    }
}

pub fn admin_user() -> User {
    user(1, "admin", Role::Admin, None)
}

pub fn overview_user() -> User {
    user(2, "overview", Role::Overview, None)
}

fn volunteer_user(volunteer_id: u32, level: VolunteerLevel) -> User {
    let profile = VolunteerProfile {
        id: volunteer_id,
        volunteer_id: 100 + volunteer_id,
        name: format!("Volunteer {}", volunteer_id),
        level,
        parent_volunteer: None,
    };
    user(
        10 + volunteer_id,
        &format!("vol{}", volunteer_id),
        Role::Volunteer,
        Some(profile),
    )
}

pub fn level1_user(volunteer_id: u32) -> User {
    volunteer_user(volunteer_id, VolunteerLevel::Level1)
}

pub fn level2_user(volunteer_id: u32) -> User {
    volunteer_user(volunteer_id, VolunteerLevel::Level2)
}

pub fn volunteer(id: u32, level: VolunteerLevel) -> Volunteer {
    Volunteer {
        id,
        volunteer_id: 100 + id,
        name: format!("Volunteer {}", id),
        level,
        parent_volunteer: None,
        is_active: true,
        username: None,
    }
}

/// An authenticator over a fixed list of accounts.
pub struct StaticAuth {
    current: Option<User>,
    accounts: Vec<(User, String)>,
    failing: bool,
}

impl StaticAuth {
    pub fn new(current: Option<User>) -> StaticAuth {
        StaticAuth {
            current,
            accounts: Vec::new(),
            failing: false,
        }
    }

    pub fn failing() -> StaticAuth {
        StaticAuth {
            failing: true,
            ..StaticAuth::new(None)
        }
    }

    pub fn with_account(mut self, user: User, password: &str) -> StaticAuth {
        self.accounts.push((user, password.to_string()));
        self
    }
}

impl Authenticator for StaticAuth {
    fn current_user(&self) -> Result<Option<User>, ServiceError> {
        if self.failing {
            return Err(ServiceError::Unavailable("auth down".to_string()));
        }
        Ok(self.current.clone())
    }

    fn login(&mut self, username: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .accounts
            .iter()
            .find(|(u, p)| u.username == username && p == password)
            .map(|(u, _)| u.clone())
            .ok_or(ServiceError::Unauthenticated)?;
        self.current = Some(user.clone());
        Ok(user)
    }

    fn logout(&mut self) -> Result<(), ServiceError> {
        self.current = None;
        Ok(())
    }
}
