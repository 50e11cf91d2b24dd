//! Callback dispatcher for the cryptoauth HAL transport shim.
//!
//! The driver library invokes the shim with `(selector, sequence, parameter)`
//! for every transport operation; the [`Dispatcher`] routes by selector,
//! performs the matching [`Channel`](authlink_channel::Channel) primitive,
//! and answers with one of the five [`Status`] codes the library understands.
//!
//! For SEND and RECEIVE the exchange is indirect: the dispatcher pulls the
//! pending request frame from the library through the [`DriverBridge`],
//! re-validates the sequence number and length it was called with against
//! what it pulled, performs the channel I/O, and pushes the response frame
//! back. A mismatch between the two legs means the callback stream is
//! desynchronized and is never treated as success.

pub mod bridge;
pub mod dispatch;
pub mod status;

pub use bridge::DriverBridge;
pub use dispatch::{Dispatcher, Opcode};
pub use status::Status;
