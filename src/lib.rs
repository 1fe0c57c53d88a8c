//! Turn an arXiv search results URL into a RIS, BibTeX or EndNote file.

pub mod apis;
pub mod config;
pub mod export;
pub mod feed;
pub mod prompt;
pub mod query;
pub mod record;
pub mod render;
