//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and admin bootstrap (argon2 password hashes)
//! - `events` - Event validation, ownership, limits and join requests
//! - `contact` - Contact form submissions
//! - `admin` - Admin console mutations, each recorded in the admin log
//! - `settings` - Cached system settings

pub mod admin;
pub mod auth;
pub mod contact;
pub mod events;
pub mod settings;
