use authlink_frame::{TransferFrame, BUFFER_SIZE};
use authlink_hal::{DriverBridge, Status};

use crate::error;

/// The dispatch callback the shim registers with the driver library.
pub type DispatchCallbackFn = extern "C" fn(selector: u32, sequence: u32, parameter: u32) -> i32;

/// Library entry point that registers the dispatch callback.
pub type RegisterCallbackFn = unsafe extern "C" fn(callback: DispatchCallbackFn) -> i32;

/// Library entry point that copies the pending request frame out by sequence.
pub type PullRequestFn = unsafe extern "C" fn(sequence: u32, frame: *mut TransferFrame) -> i32;

/// Library entry point that copies a response frame in by sequence.
pub type PushResponseFn = unsafe extern "C" fn(sequence: u32, frame: *const TransferFrame) -> i32;

/// [`DriverBridge`] over the library's raw pull/push entry points.
///
/// All raw-pointer marshaling and bounds checking happens here, so the
/// dispatcher core only ever sees validated frames.
pub(crate) struct PointerBridge {
    pull: PullRequestFn,
    push: PushResponseFn,
}

impl PointerBridge {
    pub(crate) fn new(pull: PullRequestFn, push: PushResponseFn) -> Self {
        Self { pull, push }
    }

    fn decode_status(raw: i32, entry_point: &str) -> Status {
        match Status::from_raw(raw) {
            Some(status) => status,
            None => {
                // The library does not produce codes outside the closed set
                // today; an unknown one is reported as the permanent failure
                // with the raw value preserved in the error string.
                error::set_error_message(format!(
                    "library {entry_point} returned unknown status {raw:#x}"
                ));
                Status::GenFail
            }
        }
    }
}

impl DriverBridge for PointerBridge {
    fn pull_request(&mut self, sequence: u32) -> Result<TransferFrame, Status> {
        let mut frame = TransferFrame::zeroed();
        // SAFETY: `pull` is the library's registered entry point; `frame` is
        // a valid, writable 264-byte structure for the duration of the call.
        let raw = unsafe { (self.pull)(sequence, &mut frame) };
        match Self::decode_status(raw, "pull_request") {
            Status::Success => {
                if usize::from(frame.length_in) > BUFFER_SIZE {
                    // The frame invariant is broken before any sequencing
                    // can be judged; never let it near the channel.
                    return Err(error::set_invalid_argument(format!(
                        "pulled frame claims {} valid bytes (buffer is {})",
                        frame.length_in, BUFFER_SIZE
                    )));
                }
                Ok(frame)
            }
            status => Err(status),
        }
    }

    fn push_response(&mut self, sequence: u32, frame: &TransferFrame) -> Status {
        // SAFETY: `push` is the library's registered entry point; `frame` is
        // a valid, readable 264-byte structure for the duration of the call.
        let raw = unsafe { (self.push)(sequence, frame) };
        Self::decode_status(raw, "push_response")
    }
}
