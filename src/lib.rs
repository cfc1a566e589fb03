//! `umkm-health` library crate.
//!
//! Scores the financial health of a small business (UMKM) two ways: a trained
//! classifier loaded from an artifact bundle, and a fixed rule-based score.
//! The `umkm-health` binary is a thin CLI over this library.

pub mod artifact;
pub mod config;
pub mod features;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod scoring;
