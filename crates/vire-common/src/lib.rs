//! ---
//! vire_section: "01-core-functionality"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Shared primitives and utilities for the messaging model."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Core shared primitives for the Vire messaging workspace.
//! This crate exposes configuration loading, tracing initialisation and
//! timestamp helpers consumed by `vire-msg`.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{AppConfig, EnvelopeConfig, LoadedAppConfig, LoggingConfig};
pub use logging::{init_tracing, LogFormat};
