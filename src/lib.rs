//! Athlete registry for the Estrelas do Norte social sports project.
//!
//! The crate is split between a local-first client (cache, session,
//! repository, CLI commands) and the REST API server that backs it.

pub mod cache;
pub mod commands;
pub mod config;
pub mod directory;
pub mod models;
pub mod remote;
pub mod server;
pub mod session;
pub mod validation;
