use crate::track::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u32,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volunteer: Option<VolunteerProfile>,
    /// Lowercase hex digest of the password.
    #[serde(rename = "passwordSha256")]
    pub password_sha256: String,
}

impl UserRecord {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            volunteer: self.volunteer.clone(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WardSettings {
    #[serde(rename = "votingEnabled", default)]
    pub voting_enabled: bool,
}

impl From<WardSettings> for AppSettings {
    fn from(s: WardSettings) -> Self {
        AppSettings {
            voting_enabled: s.voting_enabled,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct WardConfig {
    #[serde(rename = "wardName")]
    pub ward_name: String,
    #[serde(rename = "divisionScheme", default)]
    pub division_scheme: DivisionScheme,
    #[serde(rename = "pageSize", default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub settings: WardSettings,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub volunteers: Vec<Volunteer>,
    #[serde(default)]
    pub voters: Vec<Voter>,
}

impl WardConfig {
    pub fn policy(&self) -> FieldPolicy {
        FieldPolicy::new(self.division_scheme, self.settings.voting_enabled)
    }

    /// The in-memory directory over the voters and volunteers of the ward.
    pub fn directory(&self) -> MemoryDirectory {
        MemoryDirectory::new(self.voters.clone())
            .with_volunteers(self.volunteers.clone())
            .with_settings(self.settings.into())
    }
}

pub fn read_ward(path: &str) -> TrackResult<WardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let config: WardConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {
        path: path.to_string(),
    })?;
    debug!(
        "read_ward: {:?}: {} users, {} volunteers, {} voters",
        config.ward_name,
        config.users.len(),
        config.volunteers.len(),
        config.voters.len()
    );
    Ok(config)
}

pub fn write_ward(path: &str, config: &WardConfig) -> TrackResult<()> {
    let contents = serde_json::to_string_pretty(config).context(SerializingJsonSnafu {
        path: path.to_string(),
    })?;
    fs::write(path, contents).context(WritingFileSnafu {
        path: path.to_string(),
    })?;
    info!("write_ward: saved {}", path);
    Ok(())
}

/// An earlier report, as written by the export command.
pub fn read_summary(path: &str) -> TrackResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: path.to_string(),
    })?;
    debug!("read_summary: {:?}", js.get("summary"));
    Ok(js)
}
