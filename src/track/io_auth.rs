use crate::track::config_reader::UserRecord;
use crate::track::*;

/// The store key holding the name of the logged-in user.
pub const SESSION_KEY: &str = "session_user";

pub fn password_digest(password: &str) -> String {
    sha256::digest(password)
}

/// Checks passwords against the digests of the ward file.
///
/// The logged-in user name is kept by the caller in the local store, the
/// authenticator only tracks it for the duration of a command.
#[derive(Debug, Clone)]
pub struct FileAuthenticator {
    users: Vec<UserRecord>,
    current: Option<String>,
}

impl FileAuthenticator {
    pub fn new(users: Vec<UserRecord>, current: Option<String>) -> FileAuthenticator {
        FileAuthenticator { users, current }
    }

    pub fn current_username(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn find(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }
}

impl Authenticator for FileAuthenticator {
    fn current_user(&self) -> Result<Option<User>, ServiceError> {
        match self.current.as_deref() {
            None => Ok(None),
            Some(name) => match self.find(name) {
                Some(record) => Ok(Some(record.user())),
                // The account was removed from the ward file since the login.
                None => Err(ServiceError::Unauthenticated),
            },
        }
    }

    fn login(&mut self, username: &str, password: &str) -> Result<User, ServiceError> {
        let record = self.find(username).ok_or(ServiceError::Unauthenticated)?;
        if !record
            .password_sha256
            .eq_ignore_ascii_case(&password_digest(password))
        {
            debug!("login: wrong password for {:?}", username);
            return Err(ServiceError::Unauthenticated);
        }
        let user = record.user();
        self.current = Some(user.username.clone());
        Ok(user)
    }

    fn logout(&mut self) -> Result<(), ServiceError> {
        self.current = None;
        Ok(())
    }
}
