use crate::track::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// `ward.json` keeps its local store in `ward.store.json`.
pub fn default_store_path(ward_path: &str) -> PathBuf {
    let p = Path::new(ward_path);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ward");
    p.with_file_name(format!("{}.store.json", stem))
}

/// One line of a voter list, with the party hidden behind the division for non-administrators.
pub fn voter_line(policy: &FieldPolicy, caps: &Capabilities, v: &Voter, lang: Language) -> String {
    let voted = if v.has_voted {
        messages::VOTED
    } else {
        messages::NOT_VOTED
    };
    format!(
        "{:>5}  {:<28} {:<24} {:<14} {:<12} {}",
        v.serial_no,
        v.name(lang),
        v.house_name(lang),
        messages::status_label(&v.status, lang),
        policy.party_display(caps, v.party, lang),
        voted.get(lang)
    )
}

pub fn parse_language(code: &str) -> TrackResult<Language> {
    match Language::from_code(code.trim()) {
        Some(lang) => Ok(lang),
        None => whatever!("Unknown language {:?} (expected en or ml)", code),
    }
}

pub fn parse_level(code: &str) -> TrackResult<VolunteerLevel> {
    match code.trim().to_ascii_lowercase().as_str() {
        "1" | "level1" => Ok(VolunteerLevel::Level1),
        "2" | "level2" => Ok(VolunteerLevel::Level2),
        x => whatever!("Unknown volunteer level {:?} (expected level1 or level2)", x),
    }
}

pub fn parse_status(code: &str) -> TrackResult<VoterStatus> {
    let code = code.trim();
    if code.is_empty() {
        whatever!("Empty voter status");
    }
    Ok(VoterStatus::from(code.to_ascii_lowercase()))
}
