//! Core library for the `poke` CLI.
//!
//! Builds HTTP requests from flags or saved request files, renders
//! `{{env.*}}` / `{{history.*}}` placeholders, resolves the body, and sends
//! it with retries, response assertions, and optional concurrent repeats.
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod history;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod template;
