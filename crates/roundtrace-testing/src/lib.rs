//! Testing infrastructure for roundtrace tests.
//!
//! This crate provides utilities shared by the other crates' tests:
//! - `builders`: Terse message constructors for hand-written conversations
//! - `fixtures`: Canned sample logs and their location on disk
//! - `TestWorld`: Isolated environment for running the CLI binary
//! - `assertions`: Checks against the CLI's JSON output

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod world;

pub use fixtures::SampleFiles;
pub use world::{CliResult, TestWorld};
