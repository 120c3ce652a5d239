//! Safari bookmark store editor.
//!
//! Layers:
//! - domain: typed bookmark model, mutation rules, error taxonomy, ports
//! - usecase: locate/load/mutate/persist workflow + progress events
//! - infrastructure: plist codec, format converters, file system adapters
//! - interface: CLI wiring and configuration

pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod usecase;
