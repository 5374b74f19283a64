//! Simulated network-intrusion detection models.
//!
//! Two models share one command interface: an autoencoder that
//! flags rows with a high reconstruction error, and a classifier
//! that labels samples as normal traffic or one of four attack
//! families. Each process run reads one JSON request from stdin
//! and writes one JSON response to stdout.

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
