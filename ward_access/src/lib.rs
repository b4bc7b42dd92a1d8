/*!
Access control and data entry for a ward voter-tracking dashboard.

The crate decides who sees what in the dashboard of a ward: which pages a role
may open, which voter fields it can read or change, how parties are hidden
behind division letters, and how voters are marked as voted on election day.
The remote services (authentication, voter and volunteer directories, settings,
statistics, local storage, report generation) are traits in [`services`].

```
use ward_access::directory::MemoryDirectory;
use ward_access::entry::{DataEntry, Submission};
use ward_access::services::MemoryStore;
use ward_access::*;

let voter = Voter {
    id: 1,
    serial_no: 202,
    sec_id: None,
    name_en: "Anitha K".to_string(),
    name_ml: None,
    house_name_en: "Puthenveedu".to_string(),
    house_name_ml: None,
    status: VoterStatus::Active,
    party: Party::Ldf,
    has_voted: false,
    phone_number: None,
    notes: None,
    level1_volunteer: None,
    level2_volunteer: None,
    gender: None,
    age: None,
    time_voted: None,
};
let mut dir = MemoryDirectory::new(vec![voter])
    .with_settings(AppSettings { voting_enabled: true });
let mut store = MemoryStore::new();

let mut entry = DataEntry::new(&dir, &store);
entry.set_input("202");
let res = entry.submit(&mut dir, &mut store);
assert!(matches!(res, Submission::Marked(_)));
assert_eq!(entry.trail().len(), 1);
```

See the [`manual`] and the [`quick_start`] for the command line tool.
*/

mod config;

pub mod directory;
pub mod entry;
pub mod export;
pub mod fields;
pub mod listing;
pub mod manual;
pub mod messages;
pub mod quick_start;
pub mod routes;
pub mod services;
pub mod session;
pub mod stats;

#[cfg(test)]
mod testing;

pub use crate::config::*;
