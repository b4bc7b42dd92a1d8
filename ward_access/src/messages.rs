//! English and Malayalam texts emitted by the workflows.

use crate::config::*;
use crate::services::LocalStore;

/// The store key holding the language preference.
pub const LANGUAGE_KEY: &str = "language";

/// A piece of text in both display languages.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Text {
    pub en: &'static str,
    pub ml: &'static str,
}

impl Text {
    pub const fn new(en: &'static str, ml: &'static str) -> Text {
        Text { en, ml }
    }

    pub fn get(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.en,
            Language::Ml => self.ml,
        }
    }
}

pub const STATUS: Text = Text::new("Status", "സ്റ്റാറ്റസ്");
pub const PARTY: Text = Text::new("Party", "പാർട്ടി");
pub const DIVISION: Text = Text::new("Division", "ഡിവിഷൻ");
pub const VOTING_STATUS: Text = Text::new("Voting Status", "വോട്ടിംഗ് സ്റ്റാറ്റസ്");
pub const PHONE_NUMBER: Text = Text::new("Phone Number", "ഫോൺ നമ്പർ");
pub const NOTES: Text = Text::new("Notes", "കുറിപ്പുകൾ");
pub const VOTED: Text = Text::new("Voted", "വോട്ട് ചെയ്തു");
pub const NOT_VOTED: Text = Text::new("Not Voted", "വോട്ട് ചെയ്തിട്ടില്ല");
pub const NOT_PROVIDED: Text = Text::new("Not provided", "നൽകിയിട്ടില്ല");
pub const NO_NOTES: Text = Text::new("No notes", "കുറിപ്പുകളൊന്നുമില്ല");
pub const CHANGES_SAVED: Text = Text::new("Changes saved successfully!", "മാറ്റങ്ങൾ വിജയകരമായി സംരക്ഷിച്ചു!");

fn who(voter: &VoterSnapshot, lang: Language) -> String {
    match lang {
        Language::En => format!("{} (S.No: {})", voter.name(lang), voter.serial_no),
        Language::Ml => format!("{} (ക്രമ നം: {})", voter.name(lang), voter.serial_no),
    }
}

/// The message shown for a flow error.
pub fn describe(err: &FlowError, lang: Language) -> String {
    use Language::*;
    match (err, lang) {
        (FlowError::NotFound { serial }, En) => format!("Serial number {} not found", serial),
        (FlowError::NotFound { serial }, Ml) => format!("സീരിയൽ നമ്പർ {} കണ്ടെത്തിയില്ല", serial),
        (FlowError::AlreadyProcessed { voter }, En) => {
            format!("{} is already marked as voted", who(voter, lang))
        }
        (FlowError::AlreadyProcessed { voter }, Ml) => format!(
            "{} ഇതിനകം വോട്ട് ചെയ്തതായി അടയാളപ്പെടുത്തിയിട്ടുണ്ട്",
            who(voter, lang)
        ),
        (FlowError::IneligibleStatus { voter, status }, _) => {
            ineligible(&who(voter, lang), status, lang)
        }
        (FlowError::FeatureDisabled, En) => {
            "Voting is currently disabled. Please enable it from settings.".to_string()
        }
        (FlowError::FeatureDisabled, Ml) => {
            "വോട്ടിംഗ് നിലവിൽ പ്രവർത്തനരഹിതമാണ്. ക്രമീകരണങ്ങളിൽ നിന്ന് ഇത് പ്രവർത്തനക്ഷമമാക്കുക."
                .to_string()
        }
        (FlowError::UpdateFailed { .. }, En) => "Failed to update voter status".to_string(),
        (FlowError::UpdateFailed { .. }, Ml) => {
            "വോട്ടർ സ്റ്റാറ്റസ് അപ്ഡേറ്റ് ചെയ്യുന്നതിൽ പരാജയപ്പെട്ടു".to_string()
        }
        (FlowError::LoadFailed { reason }, En) => format!("Failed to load voters: {}", reason),
        (FlowError::LoadFailed { reason }, Ml) => {
            format!("വോട്ടർമാരെ ലോഡ് ചെയ്യുന്നതിൽ പരാജയപ്പെട്ടു: {}", reason)
        }
        (FlowError::ExportFailed { reason }, En) => format!("Failed to generate report: {}", reason),
        (FlowError::ExportFailed { reason }, Ml) => {
            format!("റിപ്പോർട്ട് തയ്യാറാക്കുന്നതിൽ പരാജയപ്പെട്ടു: {}", reason)
        }
    }
}

fn ineligible(who: &str, status: &VoterStatus, lang: Language) -> String {
    match (status, lang) {
        (VoterStatus::OutOfStation, Language::En) => format!("{} is marked as Out of Station", who),
        (VoterStatus::OutOfStation, Language::Ml) => {
            format!("{} സ്റ്റേഷനു പുറത്ത് എന്ന് അടയാളപ്പെടുത്തിയിട്ടുണ്ട്", who)
        }
        (VoterStatus::Deceased, Language::En) => format!("{} is marked as Deceased", who),
        (VoterStatus::Deceased, Language::Ml) => {
            format!("{} മരണപ്പെട്ടു എന്ന് അടയാളപ്പെടുത്തിയിട്ടുണ്ട്", who)
        }
        (VoterStatus::PostalVote, Language::En) => format!("{} is marked as Postal Vote", who),
        (VoterStatus::PostalVote, Language::Ml) => {
            format!("{} തപാൽ വോട്ട് എന്ന് അടയാളപ്പെടുത്തിയിട്ടുണ്ട്", who)
        }
        (VoterStatus::Deleted, Language::En) => format!("{} is marked as Deleted", who),
        (VoterStatus::Deleted, Language::Ml) => {
            format!("{} ഇല്ലാതാക്കി എന്ന് അടയാളപ്പെടുത്തിയിട്ടുണ്ട്", who)
        }
        (_, Language::En) => format!("{} status is not Active", who),
        (_, Language::Ml) => format!("{} സ്റ്റാറ്റസ് സജീവമല്ല", who),
    }
}

/// The confirmation shown after a voter has been marked.
pub fn marked(voter: &VoterSnapshot, lang: Language) -> String {
    match lang {
        Language::En => format!("✓ {} marked as voted", who(voter, lang)),
        Language::Ml => format!("✓ {} വോട്ട് ചെയ്തതായി അടയാളപ്പെടുത്തി", who(voter, lang)),
    }
}

pub fn status_label(status: &VoterStatus, lang: Language) -> String {
    let text = match status {
        VoterStatus::Active => Text::new("Active", "സജീവം"),
        VoterStatus::OutOfStation => Text::new("Out of Station", "സ്റ്റേഷനു പുറത്ത്"),
        VoterStatus::Deceased => Text::new("Deceased", "മരണപ്പെട്ടു"),
        VoterStatus::PostalVote => Text::new("Postal Vote", "തപാൽ വോട്ട്"),
        VoterStatus::Deleted => Text::new("Deleted", "ഇല്ലാതാക്കി"),
        VoterStatus::Other(code) => return code.clone(),
    };
    text.get(lang).to_string()
}

/// The literal party name, as only administrators get to see it.
pub fn party_label(party: Party, lang: Language) -> &'static str {
    match party {
        Party::Ldf => "LDF",
        Party::Udf => "UDF",
        Party::Bjp => "BJP",
        Party::Other => Text::new("Other", "മറ്റുള്ളവ").get(lang),
        Party::Unknown => Text::new("Unknown", "അറിയില്ല").get(lang),
    }
}

impl Language {
    /// The saved preference, English when nothing (or garbage) is stored.
    pub fn load(store: &dyn LocalStore) -> Language {
        store
            .get(LANGUAGE_KEY)
            .and_then(|s| Language::from_code(&s))
            .unwrap_or_default()
    }

    pub fn save(self, store: &mut dyn LocalStore) -> Result<(), ServiceError> {
        store.set(LANGUAGE_KEY, self.code().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;
    use crate::testing::*;

    #[test]
    fn each_inactive_status_has_its_own_message() {
        let snap = voter(3, 202).snapshot();
        let mut seen = Vec::new();
        for status in VoterStatus::KNOWN.iter().skip(1) {
            let msg = describe(
                &FlowError::IneligibleStatus {
                    voter: snap.clone(),
                    status: status.clone(),
                },
                Language::En,
            );
            assert!(msg.contains("S.No: 202"), "{}", msg);
            assert!(!seen.contains(&msg));
            seen.push(msg);
        }
        let generic = describe(
            &FlowError::IneligibleStatus {
                voter: snap,
                status: VoterStatus::Other("shifted".to_string()),
            },
            Language::En,
        );
        assert!(generic.ends_with("status is not Active"));
    }

    #[test]
    fn malayalam_messages_fall_back_to_the_english_name() {
        let mut v = voter(1, 101);
        v.name_en = "Ravi".to_string();
        v.name_ml = Some(" ".to_string());
        let msg = marked(&v.snapshot(), Language::Ml);
        assert_eq!(msg, "✓ Ravi (ക്രമ നം: 101) വോട്ട് ചെയ്തതായി അടയാളപ്പെടുത്തി");
    }

    #[test]
    fn language_preference_round_trips_through_the_store() {
        let mut store = MemoryStore::new();
        assert_eq!(Language::load(&store), Language::En);
        Language::Ml.save(&mut store).unwrap();
        assert_eq!(Language::load(&store), Language::Ml);
        store.set(LANGUAGE_KEY, "fr".to_string()).unwrap();
        assert_eq!(Language::load(&store), Language::En);
    }
}
