//! Student portal REST backend: per-role session handling, roster
//! aggregation and notification management over a pluggable store.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
