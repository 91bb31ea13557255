//! Core engine for pages-rail
//!
//! - **sequencer**: gate plus the two-stage publish state machine
//! - **collaborators**: `Builder`, `VersionSource` and `Publisher` seams
//! - **build**: subprocess implementations of the build and probe seams
//! - **pages**: merge-replace publisher on top of system git
//! - **artifact**: artifact kinds, publish targets and the probed version
//! - **event**: trigger events from the CI scheduler
//! - **config**: pages.toml parsing and validation
//! - **plan**: dry-run plans with content-hash ids
//! - **error**: error types with contextual help and exit codes
//! - **vcs**: git operations (SystemGit)

pub mod artifact;
pub mod build;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod event;
pub mod pages;
pub mod plan;
pub mod sequencer;
pub mod vcs;
