use authlink_frame::TransferFrame;

use crate::status::Status;

/// The library-facing pull/push primitives.
///
/// The driver library owns the frames it exchanges with the shim; the
/// dispatcher reaches them only through these two calls. They are provided
/// by the library (or, at the foreign-function boundary, by an adapter over
/// its entry points), never implemented by the shim itself.
pub trait DriverBridge {
    /// Fetch the pending request frame for `sequence`.
    ///
    /// Fails with the library's own status when no request is pending or
    /// the sequence is unknown; that status is propagated to the library
    /// unchanged.
    fn pull_request(&mut self, sequence: u32) -> Result<TransferFrame, Status>;

    /// Hand a response frame back to the library for `sequence`.
    fn push_response(&mut self, sequence: u32, frame: &TransferFrame) -> Status;
}
