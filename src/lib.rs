//! Offline-first storage for a memory diary.
//!
//! Diary entries are always written to a local SQLite store first. A remote
//! memory service, when configured, is kept in step on a best-effort basis:
//! the user never loses an entry because the network, the service, or its
//! configuration is missing.
//!
//! | Operation | Local store | Remote service |
//! |-----------|-------------|----------------|
//! | save      | always written | mirrored, failures ignored |
//! | list      | always read | merged by id when reachable, local wins |
//! | delete    | always removed | mirrored, failures ignored |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: The local durable store: schema, upsert/list/delete, health checks
//! - [`memory`]: Entry type, reconciliation policy, sync engine, legacy import
//! - [`remote`]: HTTP client for the remote memory service and wire translation
//! - [`oracle`]: Code-keyed report lookup with proxy, registry, and demo fallbacks

pub mod config;
pub mod db;
pub mod memory;
pub mod oracle;
pub mod remote;
