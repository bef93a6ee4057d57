//! Classes, dorms and posts, and the cascading deletes that keep candidates,
//! nominations and votes consistent with them.

use rocket::serde::json::json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    audit::LogKind,
    directory::{required, Directory},
    post::{Post, PostCategory},
};

/// A request to create a class or dorm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameSpec {
    pub name: String,
}

/// A request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSpec {
    pub name: String,
    #[serde(default)]
    pub category: PostCategory,
}

/// Trim and push `name` onto `list`, refusing blanks and duplicates.
fn add_unique(list: &mut Vec<String>, what: &str, name: &str) -> Result<String> {
    let name = required(what, name)?;
    if list.contains(&name) {
        return Err(Error::duplicate(format!("{what} '{name}' already exists")));
    }
    list.push(name.clone());
    Ok(name)
}

impl Directory {
    pub fn add_class(&mut self, spec: NameSpec) -> Result<String> {
        let name = add_unique(&mut self.collections.classes, "Class", &spec.name)?;
        self.log(LogKind::Class, format!("Added class: {name}"));
        Ok(name)
    }

    /// Delete a class and every candidate and nomination in it.
    /// Returns `false` if there was no such class.
    pub fn delete_class(&mut self, name: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != name);
        if self.classes.len() == before {
            return false;
        }

        let candidates = self.candidates.len();
        let nominations = self.nominations.len();
        self.candidates.retain(|c| c.class != name);
        self.nominations.retain(|n| n.class != name);
        let removed = json!({
            "candidates": candidates - self.candidates.len(),
            "nominations": nominations - self.nominations.len(),
        });
        self.log_with(LogKind::Class, format!("Deleted class: {name}"), removed);
        true
    }

    pub fn add_dorm(&mut self, spec: NameSpec) -> Result<String> {
        let name = add_unique(&mut self.collections.dorms, "Dorm", &spec.name)?;
        self.log(LogKind::Dorm, format!("Added dorm: {name}"));
        Ok(name)
    }

    /// Delete a dorm and every candidate and nomination in it.
    /// Returns `false` if there was no such dorm.
    pub fn delete_dorm(&mut self, name: &str) -> bool {
        let before = self.dorms.len();
        self.dorms.retain(|d| d != name);
        if self.dorms.len() == before {
            return false;
        }

        let candidates = self.candidates.len();
        let nominations = self.nominations.len();
        self.candidates.retain(|c| c.dorm != name);
        self.nominations.retain(|n| n.dorm != name);
        let removed = json!({
            "candidates": candidates - self.candidates.len(),
            "nominations": nominations - self.nominations.len(),
        });
        self.log_with(LogKind::Dorm, format!("Deleted dorm: {name}"), removed);
        true
    }

    pub fn add_post(&mut self, spec: PostSpec) -> Result<Post> {
        let name = required("Post", &spec.name)?;
        if self.post(&name).is_some() {
            return Err(Error::duplicate(format!("Post '{name}' already exists")));
        }

        let post = Post::new(name, spec.category);
        self.posts.push(post.clone());
        self.log_with(
            LogKind::Post,
            format!("Added post: {}", post.name),
            json!({ "category": post.category }),
        );
        Ok(post)
    }

    /// Delete a post along with its candidates, nominations and votes.
    /// Returns `false` if there was no such post.
    pub fn delete_post(&mut self, name: &str) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.name != name);
        if self.posts.len() == before {
            return false;
        }

        let candidates = self.candidates.len();
        let nominations = self.nominations.len();
        let votes = self.votes.len();
        self.candidates.retain(|c| c.post != name);
        self.nominations.retain(|n| n.post != name);
        self.votes.retain(|v| v.post != name);
        let removed = json!({
            "candidates": candidates - self.candidates.len(),
            "nominations": nominations - self.nominations.len(),
            "votes": votes - self.votes.len(),
        });
        self.log_with(LogKind::Post, format!("Deleted post: {name}"), removed);
        true
    }
}
