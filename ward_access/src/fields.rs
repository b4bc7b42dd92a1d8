//! What a viewer sees of a voter, and what they may change.
//!
//! Party affiliations are only shown as such to administrators. Every other
//! role sees an opaque "division" letter instead. Two letter schemes exist;
//! the dataset chooses which one is in use.

use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::*;
use crate::messages::{self, Text};
use crate::session::Capabilities;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DivisionScheme {
    /// ldf → A, udf → B, bjp → C, other → D.
    Sequential,
    /// ldf → L, udf → U, bjp → B, other → O.
    PartyInitials,
}

impl Default for DivisionScheme {
    fn default() -> Self {
        DivisionScheme::Sequential
    }
}

impl DivisionScheme {
    const SEQUENTIAL: [(Party, char); 4] = [
        (Party::Ldf, 'A'),
        (Party::Udf, 'B'),
        (Party::Bjp, 'C'),
        (Party::Other, 'D'),
    ];
    const INITIALS: [(Party, char); 4] = [
        (Party::Ldf, 'L'),
        (Party::Udf, 'U'),
        (Party::Bjp, 'B'),
        (Party::Other, 'O'),
    ];

    fn table(&self) -> &'static [(Party, char); 4] {
        match self {
            DivisionScheme::Sequential => &Self::SEQUENTIAL,
            DivisionScheme::PartyInitials => &Self::INITIALS,
        }
    }

    /// The division letter of a party. Unknown has none.
    pub fn letter(&self, party: Party) -> Option<char> {
        self.table().iter().find(|(p, _)| *p == party).map(|(_, c)| *c)
    }

    pub fn party(&self, letter: char) -> Option<Party> {
        let letter = letter.to_ascii_uppercase();
        self.table().iter().find(|(_, c)| *c == letter).map(|(p, _)| *p)
    }

    /// "Division X", or "-" for an unknown party.
    pub fn label(&self, party: Party) -> String {
        match self.letter(party) {
            Some(c) => format!("Division {}", c),
            None => "-".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Field {
    Status,
    Party,
    HasVoted,
    PhoneNumber,
    Notes,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Status,
        Field::Party,
        Field::HasVoted,
        Field::PhoneNumber,
        Field::Notes,
    ];
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "status" => Ok(Field::Status),
            "party" | "division" => Ok(Field::Party),
            "has_voted" | "voted" => Ok(Field::HasVoted),
            "phone" | "phone_number" => Ok(Field::PhoneNumber),
            "notes" => Ok(Field::Notes),
            x => Err(format!("unknown field {:?}", x)),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FieldView {
    pub label: &'static str,
    pub display: String,
    pub editable: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct FieldPolicy {
    pub scheme: DivisionScheme,
    pub voting_enabled: bool,
}

impl FieldPolicy {
    pub fn new(scheme: DivisionScheme, voting_enabled: bool) -> FieldPolicy {
        FieldPolicy {
            scheme,
            voting_enabled,
        }
    }

    pub fn editable(&self, caps: &Capabilities, field: Field) -> bool {
        match field {
            Field::HasVoted => !caps.is_read_only && self.voting_enabled,
            _ => !caps.is_read_only,
        }
    }

    pub fn party_label(&self, caps: &Capabilities) -> Text {
        if caps.can_see_party_names {
            messages::PARTY
        } else {
            messages::DIVISION
        }
    }

    pub fn party_display(&self, caps: &Capabilities, party: Party, lang: Language) -> String {
        if caps.can_see_party_names {
            messages::party_label(party, lang).to_string()
        } else {
            self.scheme.label(party)
        }
    }

    pub fn view(&self, caps: &Capabilities, field: Field, voter: &Voter, lang: Language) -> FieldView {
        let (label, display) = match field {
            Field::Status => (
                messages::STATUS,
                messages::status_label(&voter.status, lang),
            ),
            Field::Party => (
                self.party_label(caps),
                self.party_display(caps, voter.party, lang),
            ),
            Field::HasVoted => (
                messages::VOTING_STATUS,
                if voter.has_voted {
                    messages::VOTED
                } else {
                    messages::NOT_VOTED
                }
                .get(lang)
                .to_string(),
            ),
            Field::PhoneNumber => (
                messages::PHONE_NUMBER,
                voter
                    .phone_number
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| messages::NOT_PROVIDED.get(lang).to_string()),
            ),
            Field::Notes => (
                messages::NOTES,
                voter
                    .notes
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| messages::NO_NOTES.get(lang).to_string()),
            ),
        };
        FieldView {
            label: label.get(lang),
            display,
            editable: self.editable(caps, field),
        }
    }

    pub fn views(&self, caps: &Capabilities, voter: &Voter, lang: Language) -> Vec<(Field, FieldView)> {
        Field::ALL
            .iter()
            .map(|f| (*f, self.view(caps, *f, voter, lang)))
            .collect()
    }

    /// Checks that this viewer may send this update for this voter.
    ///
    /// Changing the voted flag while voting is disabled is refused. Sending the
    /// current value back unchanged is not a change.
    pub fn authorize(
        &self,
        caps: &Capabilities,
        current: &Voter,
        update: &VoterUpdate,
    ) -> Result<(), EditRejection> {
        if caps.is_read_only {
            return Err(EditRejection::ReadOnly);
        }
        if update.is_empty() {
            return Err(EditRejection::NothingToUpdate);
        }
        if !self.voting_enabled && matches!(update.has_voted, Some(x) if x != current.has_voted) {
            debug!(
                "authorize: voted flag change refused for voter {}",
                current.id
            );
            return Err(EditRejection::VotingDisabled);
        }
        Ok(())
    }

    /// Reads a party as typed by this viewer.
    ///
    /// Administrators type party codes. Everybody else types division letters,
    /// optionally prefixed with "Division", or "-" for unknown.
    pub fn parse_party(&self, caps: &Capabilities, input: &str) -> Option<Party> {
        let input = input.trim();
        if caps.can_see_party_names {
            return Party::from_code(input);
        }
        if input == "-" || input.eq_ignore_ascii_case("unknown") {
            return Some(Party::Unknown);
        }
        let letter = match input.get(..8) {
            Some(prefix) if prefix.eq_ignore_ascii_case("division") => input[8..].trim(),
            _ => input,
        };
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.scheme.party(c),
            _ => None,
        }
    }
}
