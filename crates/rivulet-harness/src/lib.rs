#![forbid(unsafe_code)]

//! Harness: recorders, transcripts, and fixtures for testing streams.
//!
//! # Role in Rivulet
//! `rivulet-harness` sits beside `rivulet-core` and is used only by tests
//! and demos. It turns live subscriptions into stable, comparable output.
//!
//! # Primary responsibilities
//! - **Recorder**: an observer that keeps every event it receives, with a
//!   label and deterministic sequence numbers.
//! - **Transcript**: JSONL records of recorder output, printed when
//!   `E2E_JSONL` or `CI` is set.
//! - **ResourceStore**: a small text-resource producer that exposes reads
//!   as a [`rivulet_core::Single`].
//! - **logging**: one-call `tracing` setup for tests.

pub mod fixtures;
pub mod logging;
pub mod recorder;
pub mod transcript;

pub use fixtures::{FileReadError, ResourceStore};
pub use logging::init_test_tracing;
pub use recorder::Recorder;
pub use transcript::{Transcript, jsonl_enabled};
