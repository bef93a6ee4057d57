//! The ballot engine: which posts a student may still vote on, and recording their choices.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rocket::serde::json::json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::LogKind,
    candidate::Candidate,
    directory::Directory,
    post::{Post, PostCategory},
    student::Student,
    vote::Vote,
};

/// One post on a student's ballot, with the candidates they may choose between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPost {
    pub post: String,
    pub category: PostCategory,
    pub candidates: Vec<Candidate>,
}

/// A filled-in ballot: post name to chosen candidate name.
/// Posts left blank are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotSubmission(pub BTreeMap<String, String>);

/// A single choice cast on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleVote {
    pub post: String,
    pub candidate: String,
}

/// Outcome of a ballot submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotReceipt {
    /// How many new votes were written. Zero if every selection was already voted on.
    pub recorded: usize,
}

impl Directory {
    pub fn has_voted(&self, admission: &str, post: &str) -> bool {
        self.votes
            .iter()
            .any(|v| v.admission == admission && v.post == post)
    }

    /// Refuse any vote at or after the deadline.
    pub fn ensure_voting_open(&self, now: DateTime<Utc>) -> Result<()> {
        match self.settings.deadline {
            Some(deadline) if now >= deadline => Err(Error::VotingClosed(deadline)),
            _ => Ok(()),
        }
    }

    fn eligible_candidates<'a>(
        &'a self,
        post: &'a Post,
        student: &'a Student,
    ) -> impl Iterator<Item = &'a Candidate> {
        self.candidates
            .iter()
            .filter(move |c| post.admits(c, student))
    }

    /// The posts `student` has yet to vote on that have at least one eligible candidate.
    pub fn ballot_for(&self, student: &Student) -> Vec<BallotPost> {
        self.posts
            .iter()
            .filter(|post| !self.has_voted(&student.admission, &post.name))
            .filter_map(|post| {
                let candidates: Vec<_> = self.eligible_candidates(post, student).cloned().collect();
                (!candidates.is_empty()).then(|| BallotPost {
                    post: post.name.clone(),
                    category: post.category,
                    candidates,
                })
            })
            .collect()
    }

    /// Check that `choice` is a candidate `student` may vote for on `post`.
    fn check_choice(&self, student: &Student, post: &str, choice: &str) -> Result<()> {
        let post = self
            .post(post)
            .ok_or_else(|| Error::validation(format!("Unknown post '{post}'")))?;
        if self.eligible_candidates(post, student).any(|c| c.name == choice) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "'{choice}' is not a candidate you can vote for as {}",
                post.name
            )))
        }
    }

    fn record_vote(&mut self, student: &Student, post: &str, choice: &str, now: DateTime<Utc>) {
        self.votes.push(Vote {
            admission: student.admission.clone(),
            name: student.name.clone(),
            post: post.to_string(),
            voted_for: choice.to_string(),
            time: now,
        });
    }

    /// Record a whole ballot. Posts the student already voted on are skipped, so
    /// re-submitting is harmless. Any invalid selection fails the whole ballot.
    pub fn submit_ballot(
        &mut self,
        student: &Student,
        submission: BallotSubmission,
        now: DateTime<Utc>,
    ) -> Result<BallotReceipt> {
        self.ensure_voting_open(now)?;

        let mut accepted = Vec::new();
        for (post, choice) in &submission.0 {
            let choice = choice.trim();
            if choice.is_empty() || self.has_voted(&student.admission, post) {
                continue;
            }
            self.check_choice(student, post, choice)?;
            accepted.push((post.as_str(), choice));
        }

        for (post, choice) in &accepted {
            self.record_vote(student, post, choice, now);
        }
        if !accepted.is_empty() {
            self.log_with(
                LogKind::Vote,
                format!("Votes recorded: {} for {}", accepted.len(), student.name),
                json!({ "adm": student.admission, "count": accepted.len() }),
            );
        }

        Ok(BallotReceipt {
            recorded: accepted.len(),
        })
    }

    /// Record one vote, refusing a second vote for the same post.
    pub fn cast_vote(
        &mut self,
        student: &Student,
        vote: SingleVote,
        now: DateTime<Utc>,
    ) -> Result<Vote> {
        self.ensure_voting_open(now)?;
        let choice = vote.candidate.trim();
        if self.has_voted(&student.admission, &vote.post) {
            return Err(Error::duplicate("Already voted for this post"));
        }
        self.check_choice(student, &vote.post, choice)?;

        self.record_vote(student, &vote.post, choice, now);
        self.log_with(
            LogKind::Vote,
            format!("Vote recorded: {} for {}", student.name, vote.post),
            json!({ "adm": student.admission, "post": vote.post }),
        );
        Ok(self.votes[self.votes.len() - 1].clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn ballot(selections: &[(&str, &str)]) -> BallotSubmission {
        BallotSubmission(
            selections
                .iter()
                .map(|(post, choice)| (post.to_string(), choice.to_string()))
                .collect(),
        )
    }

    /// Candidates for every post, some outside the example student's class and dorm.
    fn election() -> Directory {
        let mut dir = Directory::example();
        let mut zawadi = Candidate::example("Zawadi", "Class Prefect", "c3");
        zawadi.class = "Form 2".to_string();
        let mut juma = Candidate::example("Juma", "Dorm Captain", "c5");
        juma.dorm = "Kenya".to_string();
        let mut unapproved = Candidate::example("Carol", "President", "c6");
        unapproved.approved = false;
        dir.candidates = vec![
            Candidate::example("Alice", "President", "c1"),
            Candidate::example("Bob", "President", "c2"),
            zawadi,
            Candidate::example("Kevin", "Class Prefect", "c4"),
            juma,
            unapproved,
        ];
        dir.students.push(Student::example());
        dir
    }

    fn names(post: &BallotPost) -> Vec<&str> {
        post.candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn ballot_respects_categories() {
        let dir = election();
        let ballot = dir.ballot_for(&Student::example());

        assert_eq!(ballot.len(), 2);
        assert_eq!(ballot[0].post, "President");
        assert_eq!(names(&ballot[0]), ["Alice", "Bob"]);
        assert_eq!(ballot[1].post, "Class Prefect");
        assert_eq!(names(&ballot[1]), ["Kevin"]);
        // "Dorm Captain" has no candidate in the student's dorm, so it is omitted.
    }

    #[test]
    fn voting_removes_post_from_ballot() {
        let mut dir = election();
        let student = Student::example();

        let receipt = dir
            .submit_ballot(&student, ballot(&[("President", "Alice")]), now())
            .unwrap();
        assert_eq!(receipt.recorded, 1);
        assert_eq!(dir.votes.len(), 1);
        assert_eq!(dir.votes[0].voted_for, "Alice");
        assert_eq!(dir.votes[0].time, now());

        let posts: Vec<_> = dir.ballot_for(&student).into_iter().map(|b| b.post).collect();
        assert_eq!(posts, ["Class Prefect"]);
    }

    #[test]
    fn resubmission_is_a_no_op() {
        let mut dir = election();
        let student = Student::example();
        let selections = ballot(&[("President", "Alice"), ("Class Prefect", "Kevin")]);

        assert_eq!(
            dir.submit_ballot(&student, selections.clone(), now()).unwrap().recorded,
            2
        );
        assert_eq!(
            dir.submit_ballot(&student, selections, now()).unwrap().recorded,
            0
        );
        assert_eq!(dir.votes.len(), 2);
        assert_eq!(dir.logs.len(), 1);
    }

    #[test]
    fn empty_selections_are_skipped() {
        let mut dir = election();
        let receipt = dir
            .submit_ballot(&Student::example(), ballot(&[("President", "  ")]), now())
            .unwrap();
        assert_eq!(receipt.recorded, 0);
        assert!(dir.votes.is_empty());
        assert!(dir.logs.is_empty());
    }

    #[test]
    fn invalid_selection_fails_whole_ballot() {
        let mut dir = election();
        let student = Student::example();

        // Zawadi is in another class.
        let result = dir.submit_ballot(
            &student,
            ballot(&[("President", "Alice"), ("Class Prefect", "Zawadi")]),
            now(),
        );
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = dir.submit_ballot(&student, ballot(&[("Treasurer", "Alice")]), now());
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = dir.submit_ballot(&student, ballot(&[("President", "Carol")]), now());
        assert!(matches!(result, Err(Error::Validation(_))));

        assert!(dir.votes.is_empty());
    }

    #[test]
    fn second_single_vote_is_a_duplicate() {
        let mut dir = election();
        let student = Student::example();
        let vote = SingleVote {
            post: "President".to_string(),
            candidate: "Alice".to_string(),
        };

        dir.cast_vote(&student, vote.clone(), now()).unwrap();
        let result = dir.cast_vote(&student, vote, now());
        assert!(matches!(result, Err(Error::Duplicate(_))));
        assert_eq!(dir.votes.len(), 1);
    }

    #[test]
    fn votes_close_at_the_deadline() {
        let mut dir = election();
        let student = Student::example();
        dir.settings.deadline = Some(now());

        let result = dir.submit_ballot(&student, ballot(&[("President", "Alice")]), now());
        assert!(matches!(result, Err(Error::VotingClosed(_))));

        let receipt = dir
            .submit_ballot(
                &student,
                ballot(&[("President", "Alice")]),
                now() - Duration::seconds(1),
            )
            .unwrap();
        assert_eq!(receipt.recorded, 1);
    }
}
