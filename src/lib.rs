//! Interaction core of the birthday greeting.
//!
//! Everything here is toolkit-free. Each mutating call returns a
//! [`timeline::Timeline`] of cues for the front end to play; state is only
//! touched by the calls themselves, so stale cues are guarded rather than
//! cancelled.

pub mod balloons;
pub mod card;
pub mod config;
pub mod effects;
pub mod error;
pub mod gallery;
pub mod music;
pub mod sections;
pub mod timeline;

pub use error::{GreetingError, Result};
