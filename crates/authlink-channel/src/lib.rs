//! Transport channel abstraction for the cryptoauth HAL shim.
//!
//! A [`Channel`] is the physical or simulated medium behind the shim. It
//! exposes four blocking primitives — wake, idle, send, receive — plus an
//! explicit, idempotent `finish` that releases channel resources. At most
//! one channel is active per process.
//!
//! [`SerialChannel`] is the built-in simulated serial connection. It answers
//! receives with a synthetic byte pattern and degrades irrecoverably after a
//! fixed number of transactions, which exercises the dispatcher's
//! fatal-error path.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{ChannelError, Result};
pub use serial::SerialChannel;
pub use traits::{Channel, Received, WAKE_ACK_MAX};
