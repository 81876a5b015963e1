//! User directory: the store behind the register and login handlers.
//!
//! Handlers only talk to the [`UserDirectory`] trait, so the in-memory map can
//! be replaced by a persistent backend without touching them.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    sync::{PoisonError, RwLock},
};
use thiserror::Error;

/// Login of the account every fresh directory starts with.
pub const SEED_LOGIN: &str = "nikita";
const SEED_PASSWORD: &str = "123";

/// A registered account.
///
/// The password is kept in plaintext (wrapped only to keep it out of logs);
/// there is no hashing anywhere in this service.
#[derive(Clone)]
pub struct UserRecord {
    pub login: String,
    pub email: Option<String>,
    pub password: SecretString,
}

impl UserRecord {
    #[must_use]
    pub fn new(login: impl Into<String>, email: Option<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            email,
            password: SecretString::from(password.into()),
        }
    }

    /// Exact string comparison against the stored password.
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.expose_secret() == candidate
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    /// A remote backend answered with an error status and a JSON body.
    #[error("user directory backend returned status {status}")]
    Remote { status: u16, body: Value },
}

pub trait UserDirectory: Send + Sync + fmt::Debug {
    /// # Errors
    /// Returns an error if the backend cannot be queried.
    fn has(&self, login: &str) -> Result<bool, DirectoryError>;

    /// # Errors
    /// Returns an error if the backend cannot be queried.
    fn get(&self, login: &str) -> Result<Option<UserRecord>, DirectoryError>;

    /// # Errors
    /// Returns an error if the backend rejects the write.
    fn set(&self, login: &str, record: UserRecord) -> Result<(), DirectoryError>;

    /// Insert `record` unless its login is already taken. Returns whether the
    /// record was inserted.
    ///
    /// The default implementation is a plain `has` followed by `set`;
    /// implementations that can do both atomically should override it.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be queried or written.
    fn insert_if_absent(&self, record: UserRecord) -> Result<bool, DirectoryError> {
        if self.has(&record.login)? {
            return Ok(false);
        }
        let login = record.login.clone();
        self.set(&login, record)?;
        Ok(true)
    }
}

/// Process-local directory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory containing only the hardcoded seed account.
    #[must_use]
    pub fn seeded() -> Self {
        let mut users = HashMap::new();
        users.insert(
            SEED_LOGIN.to_string(),
            UserRecord::new(SEED_LOGIN, None, SEED_PASSWORD),
        );
        Self {
            users: RwLock::new(users),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserDirectory for InMemoryDirectory {
    fn has(&self, login: &str) -> Result<bool, DirectoryError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.contains_key(login))
    }

    fn get(&self, login: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(login).cloned())
    }

    fn set(&self, login: &str, record: UserRecord) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.insert(login.to_string(), record);
        Ok(())
    }

    fn insert_if_absent(&self, record: UserRecord) -> Result<bool, DirectoryError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(&record.login) {
            return Ok(false);
        }
        users.insert(record.login.clone(), record);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn seeded_directory_contains_seed_account() -> Result<(), DirectoryError> {
        let directory = InMemoryDirectory::seeded();
        assert_eq!(directory.len(), 1);
        assert!(directory.has(SEED_LOGIN)?);

        let record = directory.get(SEED_LOGIN)?;
        assert!(record.is_some());
        if let Some(record) = record {
            assert!(record.password_matches("123"));
            assert!(!record.password_matches("1234"));
            assert!(record.email.is_none());
        }
        Ok(())
    }

    #[test]
    fn new_directory_is_empty() -> Result<(), DirectoryError> {
        let directory = InMemoryDirectory::new();
        assert!(directory.is_empty());
        assert!(!directory.has(SEED_LOGIN)?);
        assert!(directory.get(SEED_LOGIN)?.is_none());
        Ok(())
    }

    #[test]
    fn insert_if_absent_keeps_original_record() -> Result<(), DirectoryError> {
        let directory = InMemoryDirectory::seeded();
        let inserted = directory.insert_if_absent(UserRecord::new(
            SEED_LOGIN,
            Some("other@example.com".to_string()),
            "1",
        ))?;
        assert!(!inserted);

        let record = directory.get(SEED_LOGIN)?;
        assert!(record.is_some_and(|r| r.password_matches("123") && r.email.is_none()));
        Ok(())
    }

    #[test]
    fn set_overwrites_existing_login() -> Result<(), DirectoryError> {
        let directory = InMemoryDirectory::new();
        directory.set("anna", UserRecord::new("anna", None, "a"))?;
        directory.set("anna", UserRecord::new("anna", None, "b"))?;
        assert_eq!(directory.len(), 1);
        assert!(directory.get("anna")?.is_some_and(|r| r.password_matches("b")));
        Ok(())
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let record = UserRecord::new("anna", None, "hunter2");
        let debug = format!("{record:?}");
        assert!(debug.contains("anna"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn concurrent_registrations_insert_once() {
        let directory = Arc::new(InMemoryDirectory::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let directory = Arc::clone(&directory);
                thread::spawn(move || {
                    directory
                        .insert_if_absent(UserRecord::new("race", None, format!("p{i}")))
                        .unwrap_or(false)
                })
            })
            .collect();

        let inserted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(false))
            .filter(|inserted| *inserted)
            .count();

        assert_eq!(inserted, 1);
        assert_eq!(directory.len(), 1);
    }

    #[derive(Debug, Default)]
    struct CountingDirectory {
        inner: InMemoryDirectory,
    }

    impl UserDirectory for CountingDirectory {
        fn has(&self, login: &str) -> Result<bool, DirectoryError> {
            self.inner.has(login)
        }

        fn get(&self, login: &str) -> Result<Option<UserRecord>, DirectoryError> {
            self.inner.get(login)
        }

        fn set(&self, login: &str, record: UserRecord) -> Result<(), DirectoryError> {
            self.inner.set(login, record)
        }
    }

    #[test]
    fn default_insert_if_absent_uses_has_and_set() -> Result<(), DirectoryError> {
        let directory = CountingDirectory::default();
        assert!(directory.insert_if_absent(UserRecord::new("anna", None, "a"))?);
        assert!(!directory.insert_if_absent(UserRecord::new("anna", None, "b"))?);
        assert!(directory.get("anna")?.is_some_and(|r| r.password_matches("a")));
        Ok(())
    }
}
