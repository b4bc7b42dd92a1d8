//! Resolution of the current user into what they are allowed to do.

use std::time::Duration;

use log::{debug, info, warn};

use crate::config::*;
use crate::routes::Route;
use crate::services::Authenticator;

/// How often the voter list of a level 1 volunteer refreshes itself.
pub const LEVEL1_REFRESH: Duration = Duration::from_secs(5 * 60);

/// Everything the rest of the crate needs to know about the current user.
///
/// It is derived from a [`User`] and never stored: a fresh set is computed
/// every time the user is fetched.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Capabilities {
    pub role: Role,
    /// The volunteer record behind the account, for volunteers.
    pub volunteer_id: Option<u32>,
    pub is_admin: bool,
    pub is_overview: bool,
    pub is_level1: bool,
    pub is_level2: bool,
    pub is_read_only: bool,
    pub can_view_dashboard: bool,
    pub can_edit_voter: bool,
    pub can_see_party_names: bool,
    /// Initial filters of the voter list. The user may clear them.
    pub default_filters: VoterFilters,
    /// Where a forbidden navigation ends up.
    pub landing: Route,
    /// The target of the logo link.
    pub home: Route,
    pub auto_refresh: Option<Duration>,
}

impl Capabilities {
    pub fn resolve(user: &User) -> Capabilities {
        let profile = match user.role {
            Role::Volunteer => user.volunteer.as_ref(),
            _ => None,
        };
        let level = profile.map(|p| p.level);
        let is_admin = user.role == Role::Admin;
        let is_overview = user.role == Role::Overview;
        let is_level1 = level == Some(VolunteerLevel::Level1);
        let is_level2 = level == Some(VolunteerLevel::Level2);
        let is_read_only = is_level1 || is_overview;
        let can_view_dashboard = is_admin || is_overview;

        let default_filters = if is_level1 {
            VoterFilters {
                has_voted: Some(false),
                party: Some(Party::Ldf),
                ..Default::default()
            }
        } else {
            VoterFilters::default()
        };

        Capabilities {
            role: user.role,
            volunteer_id: profile.map(|p| p.id),
            is_admin,
            is_overview,
            is_level1,
            is_level2,
            is_read_only,
            can_view_dashboard,
            can_edit_voter: !is_read_only,
            can_see_party_names: is_admin,
            default_filters,
            landing: Route::Voters,
            home: if can_view_dashboard {
                Route::Dashboard
            } else {
                Route::Voters
            },
            auto_refresh: if is_level1 { Some(LEVEL1_REFRESH) } else { None },
        }
    }

    /// A short description of the role, as shown next to the user name.
    pub fn role_label(&self) -> &'static str {
        if self.is_admin {
            "Admin"
        } else if self.is_overview {
            "Overview"
        } else if self.is_level2 {
            "Level 2 Volunteer"
        } else if self.is_level1 {
            "Level 1 Volunteer"
        } else {
            "Volunteer"
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Session {
    /// The authentication status is not known yet.
    Loading,
    Anonymous,
    Authenticated {
        user: User,
        caps: Capabilities,
    },
}

impl Session {
    fn authenticated(user: User) -> Session {
        let caps = Capabilities::resolve(&user);
        debug!("session: {:?} resolved to {:?}", user.username, caps);
        Session::Authenticated { user, caps }
    }

    /// Asks the authentication collaborator who is logged in.
    ///
    /// Any failure is treated as nobody being logged in.
    pub fn restore(auth: &dyn Authenticator) -> Session {
        match auth.current_user() {
            Ok(Some(user)) => Session::authenticated(user),
            Ok(None) => Session::Anonymous,
            Err(e) => {
                warn!("restore: could not fetch the current user: {}", e);
                Session::Anonymous
            }
        }
    }

    pub fn login(
        auth: &mut dyn Authenticator,
        username: &str,
        password: &str,
    ) -> Result<Session, ServiceError> {
        let user = auth.login(username, password)?;
        info!("login: {} ({:?})", user.username, user.role);
        Ok(Session::authenticated(user))
    }

    /// Ends the session. The local session is dropped even if the collaborator fails.
    pub fn logout(auth: &mut dyn Authenticator) -> Session {
        if let Err(e) = auth.logout() {
            warn!("logout: {}", e);
        }
        Session::Anonymous
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        match self {
            Session::Authenticated { caps, .. } => Some(caps),
            _ => None,
        }
    }
}
