use authlink_frame::TransferFrame;
use bytes::Bytes;

use crate::error::Result;

/// Maximum length of a device wake acknowledgment, in bytes.
pub const WAKE_ACK_MAX: usize = 4;

/// Bytes handed back by a successful receive.
#[derive(Debug, Clone)]
pub struct Received {
    /// Byte count the channel reported for this read. A well-behaved channel
    /// reports exactly `bytes.len()`; the dispatcher checks.
    pub reported_len: u16,
    /// The received payload.
    pub bytes: Bytes,
}

/// A physical or simulated transport medium.
///
/// All primitives block the calling thread until the underlying operation
/// completes; timeout and retry policy belong to the driver library or the
/// channel implementation, never to the dispatcher. Exactly one channel is
/// active per process, and only the thread currently inside a dispatch call
/// touches it.
pub trait Channel {
    /// Wake the device.
    ///
    /// Returns the device's wake acknowledgment, at most [`WAKE_ACK_MAX`]
    /// bytes. Returning `None` is valid and means no acknowledgment.
    fn wake(&mut self) -> Option<Bytes>;

    /// Put the device into its idle state. No payload either way.
    fn idle(&mut self) -> Result<()>;

    /// Transmit a request frame.
    ///
    /// The implementation must keep its own copy of the accepted data; the
    /// frame is not referenced after this call returns. Returns the number
    /// of bytes the device acknowledged beyond the clean accept (0 on a
    /// clean accept).
    fn send(&mut self, frame: &TransferFrame) -> Result<u16>;

    /// Read a response of `expected_len` bytes.
    fn receive(&mut self, expected_len: u16) -> Result<Received>;

    /// Release channel resources and stop any background I/O.
    ///
    /// Idempotent and infallible; safe to call on every exit path.
    fn finish(&mut self);
}
