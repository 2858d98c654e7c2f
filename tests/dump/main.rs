//! Integration tests for complete dump runs.
//!
//! Each test builds a synthetic journal directory with the durability test
//! fixtures, runs a [`Dumper`] over it, and checks the files it wrote.

#[path = "../common/mod.rs"]
mod common;

mod corruption;
mod input_validation;
mod selection;
mod snapshot_roundtrip;
