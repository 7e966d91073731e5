//! Live counter updates for a viewed goll.
//!
//! One push-stream per viewed resource: subscribing to a new goll tears
//! the previous stream down fully before the next one opens, events for
//! other golls are dropped, and a transport error simply stops delivery
//! while the UI keeps working on the last known state.

mod connector;
mod error;
mod event;
mod subscriber;

pub use connector::{EventStream, StreamConnector, WsConnector};
pub use error::{StreamError, StreamResult};
pub use event::StreamEvent;
pub use subscriber::{LiveSubscriber, SubscriptionHandle};
