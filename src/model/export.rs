//! Vote export: votes joined with the voting student, filtered, as CSV.

use std::fmt::Write;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::directory::Directory;

pub const CSV_HEADER: &str = "Admission,Name,Position,VotedFor,Time";

/// Which attribute an export filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ExportBy {
    Class,
    Dorm,
    Post,
}

impl FromStr for ExportBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "dorm" => Ok(Self::Dorm),
            "post" => Ok(Self::Post),
            other => Err(format!("cannot filter by {other:?}")),
        }
    }
}

/// One exported vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub admission: String,
    pub name: String,
    pub position: String,
    pub voted_for: String,
    pub time: DateTime<Utc>,
}

impl Directory {
    /// Votes whose voter's class or dorm, or whose post, matches `value` ignoring case.
    /// Votes from students who are not registered are never exported.
    pub fn export_votes(&self, by: ExportBy, value: &str) -> Vec<ExportRow> {
        let value = value.trim().to_lowercase();
        self.votes
            .iter()
            .filter(|vote| {
                let Some(student) = self.student(&vote.admission) else {
                    return false;
                };
                let field = match by {
                    ExportBy::Post => &vote.post,
                    ExportBy::Class => &student.class,
                    ExportBy::Dorm => &student.dorm,
                };
                field.to_lowercase() == value
            })
            .map(|vote| ExportRow {
                admission: vote.admission.clone(),
                name: vote.name.clone(),
                position: vote.post.clone(),
                voted_for: vote.voted_for.clone(),
                time: vote.time,
            })
            .collect()
    }
}

/// Quote a CSV field if it contains a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows as CSV, header first, one line per row.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for row in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            escape(&row.admission),
            escape(&row.name),
            escape(&row.position),
            escape(&row.voted_for),
            row.time.to_rfc3339(),
        );
    }
    csv
}
