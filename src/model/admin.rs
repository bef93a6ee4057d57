//! Admin credentials and the settings only an admin may change.

use argon2::Config as Argon2Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::LogKind,
    auth::{Rights, User},
    directory::Directory,
};

/// Shortest admin password accepted on a change.
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// The (single) administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin;

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> String {
        "admin".to_string()
    }
}

/// An admin login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYear {
    pub academic_year: String,
}

/// Set the deadline, or clear it with `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deadline {
    pub deadline: Option<DateTime<Utc>>,
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt: [u8; 16] = rand::random();
    Ok(argon2::hash_encoded(
        password.as_bytes(),
        &salt,
        &Argon2Config::default(),
    )?)
}

impl Directory {
    /// Store a hash of `default_password` if no admin password has been set yet.
    pub fn ensure_admin_password(&mut self, default_password: &str) -> Result<()> {
        if self.settings.admin_password_hash.is_none() {
            self.settings.admin_password_hash = Some(hash_password(default_password)?);
            info!("No admin password set, using the configured default");
        }
        Ok(())
    }

    pub fn verify_admin_password(&self, password: &str) -> Result<bool> {
        match &self.settings.admin_password_hash {
            Some(hash) => Ok(argon2::verify_encoded(hash, password.as_bytes())?),
            None => Ok(false),
        }
    }

    /// Check the admin's password, logging the successful login.
    pub fn login_admin(&mut self, credentials: &AdminCredentials) -> Result<Admin> {
        if !self.verify_admin_password(&credentials.password)? {
            return Err(Error::unauthorized("Incorrect admin password"));
        }
        self.log(LogKind::Admin, "Admin logged in");
        Ok(Admin)
    }

    pub fn change_admin_password(&mut self, change: &PasswordChange) -> Result<()> {
        if !self.verify_admin_password(&change.current_password)? {
            return Err(Error::unauthorized("Current password is incorrect"));
        }
        if change.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(format!(
                "New password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        self.settings.admin_password_hash = Some(hash_password(&change.new_password)?);
        self.log(LogKind::Admin, "Admin password changed");
        Ok(())
    }

    pub fn set_deadline(&mut self, deadline: Option<DateTime<Utc>>) {
        self.settings.deadline = deadline;
        match deadline {
            Some(deadline) => self.log(
                LogKind::Deadline,
                format!("Voting deadline set to {}", deadline.to_rfc3339()),
            ),
            None => self.log(LogKind::Deadline, "Voting deadline cleared"),
        }
    }

    pub fn set_results_published(&mut self, published: bool) {
        self.settings.results_published = published;
        self.log(
            LogKind::Results,
            if published {
                "Results published"
            } else {
                "Results unpublished"
            },
        );
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    /// Password the test admin logs in with.
    pub const EXAMPLE_PASSWORD: &str = "admin123";

    impl AdminCredentials {
        pub fn example() -> Self {
            Self {
                password: EXAMPLE_PASSWORD.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::examples::EXAMPLE_PASSWORD;
    use super::*;

    fn with_password() -> Directory {
        let mut dir = Directory::empty();
        dir.ensure_admin_password(EXAMPLE_PASSWORD).unwrap();
        dir
    }

    #[test]
    fn default_password_is_hashed_once() {
        let mut dir = with_password();
        let hash = dir.settings.admin_password_hash.clone().unwrap();
        assert_ne!(hash, EXAMPLE_PASSWORD);

        dir.ensure_admin_password("something else").unwrap();
        assert_eq!(dir.settings.admin_password_hash, Some(hash));
        assert!(dir.verify_admin_password(EXAMPLE_PASSWORD).unwrap());
        assert!(!dir.verify_admin_password("something else").unwrap());
    }

    #[test]
    fn login_checks_password() {
        let mut dir = with_password();
        assert!(dir.login_admin(&AdminCredentials::example()).is_ok());
        let wrong = AdminCredentials {
            password: "admin124".to_string(),
        };
        assert!(matches!(dir.login_admin(&wrong), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn password_change_rules() {
        let mut dir = with_password();

        let wrong_current = PasswordChange {
            current_password: "nope".to_string(),
            new_password: "hunter22".to_string(),
        };
        assert!(matches!(
            dir.change_admin_password(&wrong_current),
            Err(Error::Unauthorized(_))
        ));

        let too_short = PasswordChange {
            current_password: EXAMPLE_PASSWORD.to_string(),
            new_password: "abcd".to_string(),
        };
        assert!(matches!(
            dir.change_admin_password(&too_short),
            Err(Error::Validation(_))
        ));

        let good = PasswordChange {
            current_password: EXAMPLE_PASSWORD.to_string(),
            new_password: "abcde".to_string(),
        };
        dir.change_admin_password(&good).unwrap();
        assert!(dir.verify_admin_password("abcde").unwrap());
        assert!(!dir.verify_admin_password(EXAMPLE_PASSWORD).unwrap());
    }

    #[test]
    fn settings_changes_are_logged() {
        let mut dir = Directory::empty();
        dir.set_results_published(true);
        dir.set_deadline(None);
        assert!(dir.settings.results_published);
        assert_eq!(dir.logs.len(), 2);
        assert_eq!(dir.logs[0].kind, LogKind::Deadline);
        assert_eq!(dir.logs[1].kind, LogKind::Results);
    }
}
