use serde::{Deserialize, Serialize};

use crate::model::{candidate::Candidate, student::Student};

/// Who a post's candidates are drawn from, and so who may see them on a ballot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostCategory {
    /// Every student votes on every candidate.
    #[default]
    SchoolWide,
    /// Students only see candidates from their own class.
    PerClass,
    /// Students only see candidates from their own dorm.
    PerDorm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub name: String,
    #[serde(default)]
    pub category: PostCategory,
}

impl Post {
    pub fn new(name: impl Into<String>, category: PostCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    /// Can `student` vote for `candidate` on this post?
    pub fn admits(&self, candidate: &Candidate, student: &Student) -> bool {
        if !candidate.approved || candidate.post != self.name {
            return false;
        }
        match self.category {
            PostCategory::SchoolWide => true,
            PostCategory::PerClass => candidate.class == student.class,
            PostCategory::PerDorm => candidate.dorm == student.dorm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_restricts_candidates() {
        let student = Student::example();
        let mut candidate = Candidate::example("Zawadi", "Class Prefect", "c1");
        candidate.class = "Form 2".to_string();

        let school = Post::new("Class Prefect", PostCategory::SchoolWide);
        let class = Post::new("Class Prefect", PostCategory::PerClass);
        let dorm = Post::new("Class Prefect", PostCategory::PerDorm);
        assert!(school.admits(&candidate, &student));
        assert!(!class.admits(&candidate, &student));
        assert!(dorm.admits(&candidate, &student));

        candidate.approved = false;
        assert!(!school.admits(&candidate, &student));
    }

    #[test]
    fn missing_category_defaults_to_school_wide() {
        let post: Post =
            rocket::serde::json::serde_json::from_str(r#"{ "name": "President" }"#).unwrap();
        assert_eq!(post.category, PostCategory::SchoolWide);
    }
}
