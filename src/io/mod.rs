//! File ingest and export, plus the synthetic demo month.

pub mod export;
pub mod import;
pub mod synthetic;
