use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use rand::Rng;
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::{LogEntry, LogKind},
    candidate::Candidate,
    nomination::Nomination,
    post::Post,
    student::Student,
    vote::Vote,
};

/// Scalar settings. These are global, not scoped to an academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 hash of the admin password. Populated at startup if missing.
    #[serde(default)]
    pub admin_password_hash: Option<String>,
    /// The academic year whose collections are currently live.
    pub academic_year: String,
    /// Votes are refused at and after this instant.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results_published: bool,
}

impl Settings {
    pub fn new(academic_year: &str) -> Self {
        Self {
            admin_password_hash: None,
            academic_year: academic_year.to_string(),
            deadline: None,
            results_published: false,
        }
    }
}

/// Every collection belonging to one academic year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub students: Vec<Student>,
    pub classes: Vec<String>,
    pub dorms: Vec<String>,
    pub posts: Vec<Post>,
    pub candidates: Vec<Candidate>,
    pub nominations: Vec<Nomination>,
    pub votes: Vec<Vote>,
    /// Newest first.
    pub logs: Vec<LogEntry>,
}

/// The live directory: settings plus the current year's collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    pub settings: Settings,
    pub collections: Collections,
}

impl Directory {
    pub fn new(settings: Settings, collections: Collections) -> Self {
        Self {
            settings,
            collections,
        }
    }

    /// Append an audit entry with no extra fields.
    pub fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.log_with(kind, message, Value::Null);
    }

    /// Append an audit entry carrying extra structured fields.
    pub fn log_with(&mut self, kind: LogKind, message: impl Into<String>, extra: Value) {
        let entry = LogEntry::new(kind, message.into(), extra);
        info!("[{}] {}", entry.kind, entry.message);
        self.collections.logs.insert(0, entry);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_dorm(&self, dorm: &str) -> bool {
        self.dorms.iter().any(|d| d == dorm)
    }

    pub fn post(&self, name: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.name == name)
    }

    /// Ensure a candidate's post, class and dorm all exist.
    pub(crate) fn check_placement(&self, post: &str, class: &str, dorm: &str) -> Result<()> {
        if self.post(post).is_none() {
            return Err(Error::validation(format!("Unknown post '{post}'")));
        }
        if !self.has_class(class) {
            return Err(Error::validation(format!("Unknown class '{class}'")));
        }
        if !self.has_dorm(dorm) {
            return Err(Error::validation(format!("Unknown dorm '{dorm}'")));
        }
        Ok(())
    }

    /// An identifier of the form `<prefix>-<millis>` that no candidate or
    /// nomination uses yet. Collisions get a random suffix.
    pub(crate) fn fresh_id(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let taken = |id: &str| {
            self.candidates.iter().any(|c| c.id == id)
                || self.nominations.iter().any(|n| n.id == id)
        };
        let mut id = format!("{prefix}-{}", now.timestamp_millis());
        while taken(&id) {
            let suffix: u16 = rand::thread_rng().gen();
            id = format!("{prefix}-{}-{suffix:04x}", now.timestamp_millis());
        }
        id
    }
}

impl Deref for Directory {
    type Target = Collections;

    fn deref(&self) -> &Self::Target {
        &self.collections
    }
}

impl DerefMut for Directory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.collections
    }
}

/// Trim a required text field, rejecting it if nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::validation(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

/// Trim an optional field, treating blank as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;
    use crate::model::post::PostCategory;

    impl Directory {
        /// An empty directory for the 2024 academic year.
        pub fn empty() -> Self {
            Self::new(Settings::new("2024"), Collections::default())
        }

        /// Two classes, two dorms, one post of each category, and no people.
        pub fn example() -> Self {
            let mut dir = Self::empty();
            dir.classes = vec!["Form 1".to_string(), "Form 2".to_string()];
            dir.dorms = vec!["Kilimanjaro".to_string(), "Kenya".to_string()];
            dir.posts = vec![
                Post::new("President", PostCategory::SchoolWide),
                Post::new("Class Prefect", PostCategory::PerClass),
                Post::new("Dorm Captain", PostCategory::PerDorm),
            ];
            dir
        }
    }
}
