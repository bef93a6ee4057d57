use chrono::{DateTime, Utc};
use rocket::serde::json::json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::LogKind,
    directory::{optional, required, Directory},
    nomination::Nomination,
};

/// Manifesto recorded for candidates the admin adds directly.
pub const ADMIN_MANIFESTO: &str = "Added by admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub post: String,
    pub class: String,
    pub dorm: String,
    pub manifesto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub approved: bool,
}

impl From<Nomination> for Candidate {
    /// The candidate an approved nomination becomes. It keeps the nomination's id.
    fn from(nomination: Nomination) -> Self {
        Self {
            id: nomination.id,
            name: nomination.name,
            post: nomination.post,
            class: nomination.class,
            dorm: nomination.dorm,
            manifesto: nomination.manifesto,
            photo: nomination.photo,
            approved: true,
        }
    }
}

/// A request from the admin to add a candidate directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub post: String,
    pub class: String,
    pub dorm: String,
    #[serde(default)]
    pub manifesto: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl Directory {
    /// Votes name their candidate, so a post cannot have two candidates of the same name.
    pub(crate) fn ensure_new_candidate(&self, post: &str, name: &str) -> Result<()> {
        if self.candidates.iter().any(|c| c.post == post && c.name == name) {
            return Err(Error::duplicate(format!(
                "{name} is already a candidate for {post}"
            )));
        }
        Ok(())
    }

    /// Add an approved candidate on the admin's say-so.
    pub fn add_candidate(&mut self, spec: CandidateSpec, now: DateTime<Utc>) -> Result<Candidate> {
        let name = required("Name", &spec.name)?;
        let post = required("Post", &spec.post)?;
        let class = required("Class", &spec.class)?;
        let dorm = required("Dorm", &spec.dorm)?;
        self.check_placement(&post, &class, &dorm)?;
        self.ensure_new_candidate(&post, &name)?;

        let candidate = Candidate {
            id: self.fresh_id("admin", now),
            name,
            post,
            class,
            dorm,
            manifesto: optional(spec.manifesto).unwrap_or_else(|| ADMIN_MANIFESTO.to_string()),
            photo: optional(spec.photo),
            approved: true,
        };
        self.candidates.push(candidate.clone());
        self.log_with(
            LogKind::Candidate,
            format!("Admin added candidate: {} for {}", candidate.name, candidate.post),
            json!({ "id": candidate.id }),
        );
        Ok(candidate)
    }

    /// Remove a single candidate. Returns `false` if there was no such candidate.
    pub fn delete_candidate(&mut self, id: &str) -> bool {
        let Some(index) = self.candidates.iter().position(|c| c.id == id) else {
            return false;
        };
        let candidate = self.candidates.remove(index);
        self.log_with(
            LogKind::Candidate,
            format!("Deleted candidate: {} ({})", candidate.name, candidate.post),
            json!({ "id": candidate.id }),
        );
        true
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl Candidate {
        /// An approved candidate from Form 1, Kilimanjaro.
        pub fn example(name: &str, post: &str, id: &str) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                post: post.to_string(),
                class: "Form 1".to_string(),
                dorm: "Kilimanjaro".to_string(),
                manifesto: "Better meals".to_string(),
                photo: None,
                approved: true,
            }
        }
    }

    impl CandidateSpec {
        pub fn example() -> Self {
            Self {
                name: "Alice".to_string(),
                post: "President".to_string(),
                class: "Form 1".to_string(),
                dorm: "Kilimanjaro".to_string(),
                manifesto: None,
                photo: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_candidates_are_approved() {
        let mut dir = Directory::example();
        let candidate = dir.add_candidate(CandidateSpec::example(), Utc::now()).unwrap();
        assert!(candidate.approved);
        assert_eq!(candidate.manifesto, ADMIN_MANIFESTO);
        assert!(candidate.id.starts_with("admin-"));
        assert_eq!(dir.candidates, vec![candidate]);
    }

    #[test]
    fn admin_candidates_are_validated() {
        let mut dir = Directory::example();

        let mut unknown_post = CandidateSpec::example();
        unknown_post.post = "Treasurer".to_string();
        assert!(matches!(
            dir.add_candidate(unknown_post, Utc::now()),
            Err(Error::Validation(_))
        ));

        let mut blank = CandidateSpec::example();
        blank.name = String::new();
        assert!(matches!(
            dir.add_candidate(blank, Utc::now()),
            Err(Error::Validation(_))
        ));

        dir.add_candidate(CandidateSpec::example(), Utc::now()).unwrap();
        assert!(matches!(
            dir.add_candidate(CandidateSpec::example(), Utc::now()),
            Err(Error::Duplicate(_))
        ));
        assert_eq!(dir.candidates.len(), 1);
    }

    #[test]
    fn delete_only_touches_that_candidate() {
        let mut dir = Directory::example();
        dir.candidates = vec![
            Candidate::example("Alice", "President", "c1"),
            Candidate::example("Bob", "President", "c2"),
        ];
        assert!(dir.delete_candidate("c1"));
        assert!(!dir.delete_candidate("c1"));
        assert_eq!(dir.candidates.len(), 1);
        assert_eq!(dir.candidates[0].id, "c2");
    }
}
