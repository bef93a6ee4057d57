use chrono::{DateTime, Utc};
use rocket::serde::json::json;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    audit::LogKind,
    candidate::Candidate,
    directory::{optional, required, Directory},
    student::Student,
};

/// Where a nomination is in its lifecycle. Only pending nominations are stored;
/// approved ones become candidates and rejected ones are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NominationState {
    Pending,
    Approved,
    Rejected,
}

/// A student's request to stand for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub id: String,
    pub submitted_by: String,
    pub name: String,
    pub post: String,
    pub class: String,
    pub dorm: String,
    pub manifesto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub state: NominationState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominationSpec {
    pub name: String,
    pub post: String,
    pub class: String,
    pub dorm: String,
    pub manifesto: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl Directory {
    /// Record a pending nomination submitted by `student`.
    pub fn submit_nomination(
        &mut self,
        student: &Student,
        spec: NominationSpec,
        now: DateTime<Utc>,
    ) -> Result<Nomination> {
        let name = required("Name", &spec.name)?;
        let post = required("Post", &spec.post)?;
        let class = required("Class", &spec.class)?;
        let dorm = required("Dorm", &spec.dorm)?;
        let manifesto = required("Manifesto", &spec.manifesto)?;
        self.check_placement(&post, &class, &dorm)?;
        self.ensure_new_candidate(&post, &name)?;

        let nomination = Nomination {
            id: self.fresh_id(&student.admission, now),
            submitted_by: student.admission.clone(),
            name,
            post,
            class,
            dorm,
            manifesto,
            photo: optional(spec.photo),
            state: NominationState::Pending,
        };
        self.nominations.push(nomination.clone());
        self.log_with(
            LogKind::Nomination,
            format!("Nomination submitted: {} for {}", nomination.name, nomination.post),
            json!({ "adm": student.admission, "id": nomination.id }),
        );
        Ok(nomination)
    }

    pub fn pending_nominations(&self) -> impl Iterator<Item = &Nomination> {
        self.nominations
            .iter()
            .filter(|n| n.state == NominationState::Pending)
    }

    fn pending_index(&self, id: &str) -> Option<usize> {
        self.nominations
            .iter()
            .position(|n| n.id == id && n.state == NominationState::Pending)
    }

    /// Turn a pending nomination into an approved candidate.
    /// Returns `None` if there is no pending nomination with that id, and fails if
    /// the post already has a candidate of that name.
    pub fn approve_nomination(&mut self, id: &str) -> Result<Option<Candidate>> {
        let Some(index) = self.pending_index(id) else {
            return Ok(None);
        };
        let pending = &self.nominations[index];
        self.ensure_new_candidate(&pending.post, &pending.name)?;

        let mut nomination = self.nominations.remove(index);
        nomination.state = NominationState::Approved;
        let candidate = Candidate::from(nomination);
        self.candidates.push(candidate.clone());
        self.log_with(
            LogKind::Nomination,
            format!("Nomination approved: {} for {}", candidate.name, candidate.post),
            json!({ "id": candidate.id }),
        );
        Ok(Some(candidate))
    }

    /// Discard a pending nomination.
    /// Returns `None` if there is no pending nomination with that id.
    pub fn reject_nomination(&mut self, id: &str) -> Option<Nomination> {
        let index = self.pending_index(id)?;
        let mut nomination = self.nominations.remove(index);
        nomination.state = NominationState::Rejected;
        self.log_with(
            LogKind::Nomination,
            format!("Nomination rejected: {} for {}", nomination.name, nomination.post),
            json!({ "id": nomination.id }),
        );
        Some(nomination)
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl Nomination {
        /// A pending nomination from Form 1, Kilimanjaro, submitted by student 1001.
        pub fn example(name: &str, post: &str, id: &str) -> Self {
            Self {
                id: id.to_string(),
                submitted_by: "1001".to_string(),
                name: name.to_string(),
                post: post.to_string(),
                class: "Form 1".to_string(),
                dorm: "Kilimanjaro".to_string(),
                manifesto: "More clubs".to_string(),
                photo: None,
                state: NominationState::Pending,
            }
        }
    }

    impl NominationSpec {
        pub fn example() -> Self {
            Self {
                name: "Alice Wanjiru".to_string(),
                post: "President".to_string(),
                class: "Form 1".to_string(),
                dorm: "Kilimanjaro".to_string(),
                manifesto: "More clubs".to_string(),
                photo: None,
            }
        }
    }
}
