//! Core types for Countdown Events.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod event_type;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use event_type::{BuiltinEventType, CustomEventType, EventIcon, EventTypeError, ThemeColor};
pub use id::*;
pub use status::*;
