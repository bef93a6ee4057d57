pub mod admin;
pub mod audit;
pub mod auth;
pub mod ballot;
pub mod candidate;
pub mod directory;
pub mod export;
pub mod nomination;
pub mod post;
pub mod results;
pub mod roster;
pub mod store;
pub mod student;
pub mod vote;
