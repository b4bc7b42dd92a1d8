//! The navigable pages and who may open them.

use std::fmt::Display;
use std::str::FromStr;

use log::debug;

use crate::messages::Text;
use crate::session::{Capabilities, Session};

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Route {
    Login,
    Dashboard,
    DataEntry,
    Volunteers,
    VolunteerVoters(u32),
    Voters,
    VoterDetail(u32),
}

/// Who may open a route.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Access {
    Public,
    Authenticated,
    AdminOrOverview,
    AdminOnly,
}

impl Route {
    pub fn access(&self) -> Access {
        match self {
            Route::Login => Access::Public,
            Route::Voters | Route::VoterDetail(_) => Access::Authenticated,
            Route::Dashboard | Route::Volunteers | Route::VolunteerVoters(_) => {
                Access::AdminOrOverview
            }
            Route::DataEntry => Access::AdminOnly,
        }
    }

    pub fn permits(&self, caps: &Capabilities) -> bool {
        match self.access() {
            Access::Public | Access::Authenticated => true,
            Access::AdminOrOverview => caps.is_admin || caps.is_overview,
            Access::AdminOnly => caps.is_admin,
        }
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    /// Unknown paths fall back to the voter list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();
        let id = |p: &str| p.parse::<u32>().ok();
        let route = match parts.as_slice() {
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["data-entry"] => Route::DataEntry,
            ["volunteers"] => Route::Volunteers,
            ["volunteers", x, "voters"] => match id(x) {
                Some(i) => Route::VolunteerVoters(i),
                None => Route::Voters,
            },
            ["voters", x] => match id(x) {
                Some(i) => Route::VoterDetail(i),
                None => Route::Voters,
            },
            _ => Route::Voters,
        };
        Ok(route)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::DataEntry => write!(f, "/data-entry"),
            Route::Volunteers => write!(f, "/volunteers"),
            Route::VolunteerVoters(id) => write!(f, "/volunteers/{}/voters", id),
            Route::Voters => write!(f, "/voters"),
            Route::VoterDetail(id) => write!(f, "/voters/{}", id),
        }
    }
}

/// What to do with a navigation request.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Guard {
    ShowLoading,
    Redirect(Route),
    Render(Route),
}

/// Decides a navigation. Forbidden routes silently redirect to the landing page.
pub fn guard(session: &Session, route: Route) -> Guard {
    let res = match (session, route.access()) {
        (_, Access::Public) => Guard::Render(route),
        (Session::Loading, _) => Guard::ShowLoading,
        (Session::Anonymous, _) => Guard::Redirect(Route::Login),
        (Session::Authenticated { caps, .. }, _) => {
            if route.permits(caps) {
                Guard::Render(route)
            } else {
                Guard::Redirect(caps.landing)
            }
        }
    };
    debug!("guard: {} -> {:?}", route, res);
    res
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct NavItem {
    pub route: Route,
    pub label: Text,
}

const DASHBOARD: NavItem = NavItem {
    route: Route::Dashboard,
    label: Text::new("Dashboard", "ഡാഷ്‌ബോർഡ്"),
};
const DATA_ENTRY: NavItem = NavItem {
    route: Route::DataEntry,
    label: Text::new("Data Entry", "ഡാറ്റ എൻട്രി"),
};
const ALL_VOTERS: NavItem = NavItem {
    route: Route::Voters,
    label: Text::new("All Voters", "എല്ലാ വോട്ടർമാരും"),
};
const VOLUNTEERS: NavItem = NavItem {
    route: Route::Volunteers,
    label: Text::new("Volunteers", "സന്നദ്ധപ്രവർത്തകർ"),
};
const MY_VOTERS: NavItem = NavItem {
    route: Route::Voters,
    label: Text::new("My Voters", "എന്റെ വോട്ടർമാർ"),
};

/// The navigation menu of a role.
pub fn nav_items(caps: &Capabilities) -> Vec<NavItem> {
    if caps.is_admin {
        vec![DASHBOARD, DATA_ENTRY, ALL_VOTERS, VOLUNTEERS]
    } else if caps.is_overview {
        vec![DASHBOARD, ALL_VOTERS, VOLUNTEERS]
    } else {
        vec![MY_VOTERS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn session(user: crate::config::User) -> Session {
        Session::Authenticated {
            caps: Capabilities::resolve(&user),
            user,
        }
    }

    #[test]
    fn parses_paths() {
        let p = |s: &str| s.parse::<Route>().unwrap();
        assert_eq!(p("/"), Route::Voters);
        assert_eq!(p("/voters/12"), Route::VoterDetail(12));
        assert_eq!(p("/volunteers/3/voters"), Route::VolunteerVoters(3));
        assert_eq!(p("/data-entry/"), Route::DataEntry);
        assert_eq!(p("/nope"), Route::Voters);
        assert_eq!(p("/voters/abc"), Route::Voters);
        assert_eq!(Route::VolunteerVoters(3).to_string(), "/volunteers/3/voters");
    }

    #[test]
    fn guard_table() {
        let routes = [
            Route::Dashboard,
            Route::DataEntry,
            Route::Volunteers,
            Route::VolunteerVoters(4),
            Route::Voters,
            Route::VoterDetail(9),
        ];
        // One row per role, one column per route: true renders, false redirects to the voters.
        let table = [
            ("admin", session(admin_user()), [true, true, true, true, true, true]),
            ("overview", session(overview_user()), [true, false, true, true, true, true]),
            ("level 2", session(level2_user(2)), [false, false, false, false, true, true]),
            ("level 1", session(level1_user(1)), [false, false, false, false, true, true]),
        ];
        for (role, s, expected) in table.iter() {
            for (r, renders) in routes.iter().zip(expected.iter()) {
                let want = if *renders {
                    Guard::Render(*r)
                } else {
                    Guard::Redirect(Route::Voters)
                };
                assert_eq!(guard(s, *r), want, "{} opening {}", role, r);
            }
            assert_eq!(guard(s, Route::Login), Guard::Render(Route::Login));
        }
        for r in routes.iter() {
            assert_eq!(guard(&Session::Loading, *r), Guard::ShowLoading);
            assert_eq!(guard(&Session::Anonymous, *r), Guard::Redirect(Route::Login));
        }
        assert_eq!(guard(&Session::Anonymous, Route::Login), Guard::Render(Route::Login));
    }

    #[test]
    fn guard_is_deterministic() {
        let s = session(level1_user(1));
        let first: Vec<Guard> = ["/dashboard", "/voters", "/x"]
            .iter()
            .map(|p| guard(&s, p.parse().unwrap()))
            .collect();
        let second: Vec<Guard> = ["/dashboard", "/voters", "/x"]
            .iter()
            .map(|p| guard(&s, p.parse().unwrap()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn menus_per_role() {
        let routes = |u: crate::config::User| -> Vec<Route> {
            nav_items(&Capabilities::resolve(&u))
                .iter()
                .map(|i| i.route)
                .collect()
        };
        assert_eq!(routes(admin_user()).len(), 4);
        assert!(!routes(overview_user()).contains(&Route::DataEntry));
        assert_eq!(routes(level2_user(1)), vec![Route::Voters]);
        let items = nav_items(&Capabilities::resolve(&level1_user(1)));
        assert_eq!(items[0].label.en, "My Voters");
    }
}
