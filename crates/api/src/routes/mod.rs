pub mod common;
pub mod download;
pub mod health;
pub mod rewrite;
