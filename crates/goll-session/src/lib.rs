//! Session state, redirect intents, and the authentication gate.
//!
//! The access credential lives in memory only and is shared into the
//! request layer as an explicit context object; the redirect intent is the
//! one durable piece, remembering what a guest was trying to do across a
//! login round trip.

mod context;
mod error;
mod gate;
mod redirect;

pub use context::SessionContext;
pub use error::{SessionError, SessionResult};
pub use gate::{AuthGate, GuardOutcome};
pub use redirect::{RedirectIntent, RedirectStore, Screen};
