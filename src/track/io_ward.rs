use crate::track::*;

/// The voters of a ward file. An update is only acknowledged once the file is written.
#[derive(Debug, Clone)]
pub struct WardDirectory {
    path: String,
    config: WardConfig,
    memory: MemoryDirectory,
}

impl WardDirectory {
    pub fn open(path: &str) -> TrackResult<WardDirectory> {
        let config = read_ward(path)?;
        let memory = config.directory();
        Ok(WardDirectory {
            path: path.to_string(),
            config,
            memory,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &WardConfig {
        &self.config
    }

    pub fn memory(&self) -> &MemoryDirectory {
        &self.memory
    }

    pub fn voter_by_serial(&self, serial_no: u32) -> Option<&Voter> {
        self.memory.voter_by_serial(serial_no)
    }

    pub fn set_viewer(&mut self, caps: &Capabilities) {
        self.memory.set_viewer(caps);
    }

    /// Reads the ward file again. The viewer has to be set again afterwards.
    pub fn reload(&mut self) -> TrackResult<()> {
        *self = WardDirectory::open(&self.path)?;
        Ok(())
    }

    /// Replaces every voter of the ward and writes the file.
    pub fn replace_voters(&mut self, voters: Vec<Voter>) -> TrackResult<()> {
        let config = WardConfig {
            voters,
            ..self.config.clone()
        };
        write_ward(&self.path, &config)?;
        self.memory = config.directory();
        self.config = config;
        Ok(())
    }

    fn flush(&mut self) -> TrackResult<()> {
        let config = WardConfig {
            voters: self.memory.all_voters().to_vec(),
            ..self.config.clone()
        };
        write_ward(&self.path, &config)?;
        self.config = config;
        Ok(())
    }
}

impl VoterDirectory for WardDirectory {
    fn list(&self, query: &VoterQuery) -> Result<VoterPage, ServiceError> {
        self.memory.list(query)
    }

    fn get(&self, id: u32) -> Result<Voter, ServiceError> {
        self.memory.get(id)
    }

    fn update(&mut self, id: u32, update: &VoterUpdate) -> Result<Voter, ServiceError> {
        let before = self.memory.clone();
        let voter = self.memory.update(id, update)?;
        if let Err(e) = self.flush() {
            warn!("update: voter {} not saved: {}", id, e);
            self.memory = before;
            return Err(ServiceError::Storage(e.to_string()));
        }
        Ok(voter)
    }
}

impl VolunteerDirectory for WardDirectory {
    fn volunteers(&self, level: Option<VolunteerLevel>) -> Result<Vec<Volunteer>, ServiceError> {
        self.memory.volunteers(level)
    }

    fn volunteer(&self, id: u32) -> Result<Volunteer, ServiceError> {
        self.memory.volunteer(id)
    }

    fn volunteer_voters(
        &self,
        id: u32,
        has_voted: Option<bool>,
    ) -> Result<Vec<Voter>, ServiceError> {
        self.memory.volunteer_voters(id, has_voted)
    }
}

impl SettingsSource for WardDirectory {
    fn settings(&self) -> Result<AppSettings, ServiceError> {
        self.memory.settings()
    }
}

impl StatsSource for WardDirectory {
    fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        self.memory.dashboard_stats()
    }
}
