use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded vote. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Admission number of the voter.
    pub admission: String,
    /// Name of the voter at the time of voting.
    pub name: String,
    pub post: String,
    /// Name of the chosen candidate.
    pub voted_for: String,
    pub time: DateTime<Utc>,
}
