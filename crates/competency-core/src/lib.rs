//! competency-core: Question bank, test selection, and scoring.
//!
//! This crate holds the data model for contractor competency assessments,
//! the TOML bank format, the randomized test selector, the weighted
//! per-category scorer, and attempt reports built on top of them.

pub mod bank;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod statistics;
