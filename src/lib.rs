//! MonteSuivi: progress tracking for Montessori workshops.
//!
//! The crate stores kids, workshops and per-kid progress in SQLite, serves a
//! JSON API for the tracker screens and renders printable progress reports.

pub mod api;
pub mod board;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
