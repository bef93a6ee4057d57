use std::fmt::Display;

use chrono::{DateTime, Utc};
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

/// What kind of event an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Register,
    Login,
    Logout,
    Nomination,
    Vote,
    Class,
    Dorm,
    Post,
    Candidate,
    Admin,
    Deadline,
    Results,
    Year,
    Export,
}

impl Display for LogKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Register => "register",
                Self::Login => "login",
                Self::Logout => "logout",
                Self::Nomination => "nomination",
                Self::Vote => "vote",
                Self::Class => "class",
                Self::Dorm => "dorm",
                Self::Post => "post",
                Self::Candidate => "candidate",
                Self::Admin => "admin",
                Self::Deadline => "deadline",
                Self::Results => "results",
                Self::Year => "year",
                Self::Export => "export",
            }
        )
    }
}

/// One entry in the append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
    pub time: DateTime<Utc>,
    /// Structured context, e.g. the admission number involved.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: String, extra: Value) -> Self {
        Self {
            kind,
            message,
            time: Utc::now(),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{json, serde_json};

    use super::*;

    #[test]
    fn entries_serialize_with_type_tag() {
        let entry = LogEntry::new(
            LogKind::Register,
            "New student registered: Alice".to_string(),
            json!({ "adm": "1001" }),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "register");
        assert_eq!(value["extra"]["adm"], "1001");

        let bare = LogEntry::new(LogKind::Class, "Added class".to_string(), Value::Null);
        let value = serde_json::to_value(&bare).unwrap();
        assert!(value.get("extra").is_none());
    }
}
