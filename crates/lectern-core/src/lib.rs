//! lectern-core: session state, history, and configuration for the Lectern
//! navigation pipeline.
//!
//! This crate holds everything the router owns for the lifetime of the
//! process: the active reference of each channel, the bounded per-channel
//! command history, the external-file log, and the persisted snapshot of all
//! of the above. It has no knowledge of rendering surfaces.

pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod session;
pub mod session_store;
