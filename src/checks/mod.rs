//! Doctor checks
//!
//! All checks implement the `Check` trait and are registered in
//! [`create_default_runner`].
//!
//! # Built-in Checks
//!
//! - **git**: git is installed
//! - **config**: pages.toml parses and validates
//! - **build-tools**: build and probe programs resolve on PATH
//! - **credential**: the push token is set when the remote is https
//! - **remote-access**: the remote answers `git ls-remote` (`--thorough` only)

mod environment;
mod remotes;
mod runner;
mod trait_def;

pub use runner::create_default_runner;
pub use trait_def::{CheckContext, Severity};
