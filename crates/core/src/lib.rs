//! Countdown Core - Shared domain library.
//!
//! This crate provides the types and pure logic used by the server and CLI:
//! - `server` - Public countdown pages, dashboard API and admin console
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Every function takes its clock and randomness as
//! arguments so it can be tested deterministically.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, event types and statuses
//! - [`countdown`] - Remaining-time breakdown for a target timestamp
//! - [`settings`] - System settings with defaults
//! - [`csv`] - Join request CSV export
//! - [`links`] - Social share and `mailto:` link construction
//! - [`seo`] - Meta tags for event pages
//! - [`image`] - Background image data-URL validation
//! - [`pagination`] - Fixed-size page requests and results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod countdown;
pub mod csv;
pub mod image;
pub mod links;
pub mod pagination;
pub mod seo;
pub mod settings;
pub mod types;

pub use countdown::Countdown;
pub use pagination::{Page, PageRequest};
pub use settings::SystemSettings;
pub use types::*;
