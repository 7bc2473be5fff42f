//! Smart Readiness Indicator toolkit.
//!
//! The [`scoring`] module holds the engine (evaluation, aggregation, upgrade search),
//! [`reference`] the read-only dataset it consumes, and [`buildings`] the stored
//! building workflow exposed over HTTP.

pub mod buildings;
pub mod config;
pub mod error;
pub mod reference;
pub mod scoring;
pub mod telemetry;
