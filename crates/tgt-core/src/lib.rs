//! Core logic for the Telegram tool surface.
//!
//! The MTProto client itself is an external collaborator behind the
//! [`client::TelegramClient`] port; this crate only shapes what it returns
//! (topic ids, message records, topic pages) and wraps the tool operations
//! around it.

pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod forum;
pub mod logging;
pub mod tools;
pub mod topics;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{Error, Result};
