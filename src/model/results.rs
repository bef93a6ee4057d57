use serde::{Deserialize, Serialize};

use crate::model::{candidate::Candidate, directory::Directory, vote::Vote};

/// One candidate's line in the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub id: String,
    pub name: String,
    pub class: String,
    pub dorm: String,
    pub votes: u32,
    /// Joint leaders all have this set.
    pub leader: bool,
}

/// Results for one post, highest count first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResult {
    pub post: String,
    pub standings: Vec<Standing>,
}

/// Results as the public sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ResultsView {
    NotPublished,
    Published { posts: Vec<PostResult> },
}

/// Vote counts, parallel to the candidate list they were tallied from.
pub fn tally(candidates: &[Candidate], votes: &[Vote]) -> Vec<u32> {
    let mut counts = vec![0; candidates.len()];
    for vote in votes {
        // Votes for candidates that no longer exist are dropped.
        if let Some(index) = candidates
            .iter()
            .position(|c| c.post == vote.post && c.name == vote.voted_for)
        {
            counts[index] += 1;
        }
    }
    counts
}

/// Group tallied candidates by post, in the order posts first appear, and rank
/// each group by descending count. Ties keep their original order.
pub fn group_and_rank(candidates: &[Candidate], counts: &[u32]) -> Vec<PostResult> {
    let mut results: Vec<PostResult> = Vec::new();
    for (candidate, &votes) in candidates.iter().zip(counts) {
        let standing = Standing {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            class: candidate.class.clone(),
            dorm: candidate.dorm.clone(),
            votes,
            leader: false,
        };
        match results.iter_mut().find(|r| r.post == candidate.post) {
            Some(result) => result.standings.push(standing),
            None => results.push(PostResult {
                post: candidate.post.clone(),
                standings: vec![standing],
            }),
        }
    }

    for result in &mut results {
        result.standings.sort_by(|a, b| b.votes.cmp(&a.votes));
        let max = result.standings.first().map_or(0, |s| s.votes);
        for standing in &mut result.standings {
            standing.leader = standing.votes == max;
        }
    }
    results
}

impl Directory {
    /// Current standings regardless of whether results are published.
    pub fn live_results(&self) -> Vec<PostResult> {
        let counts = tally(&self.candidates, &self.votes);
        group_and_rank(&self.candidates, &counts)
    }

    /// Results as the public sees them. Nothing is computed until they are published.
    pub fn results(&self) -> ResultsView {
        if self.settings.results_published {
            ResultsView::Published {
                posts: self.live_results(),
            }
        } else {
            ResultsView::NotPublished
        }
    }
}
