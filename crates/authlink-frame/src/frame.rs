use crate::error::{FrameError, Result};

/// Size of the shared payload buffer in bytes.
pub const BUFFER_SIZE: usize = 256;

/// The buffer structure shared with the driver library for one exchange.
///
/// `repr(C)` because the driver library marshals this structure raw across
/// the callback boundary: sequence (4B) + length_in (2B) + length_out (2B) +
/// buffer (256B), 264 bytes total, no padding.
///
/// A frame is transient. It is zero-initialized per call, filled by one side,
/// consumed by the other, and never persisted.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TransferFrame {
    /// Request sequence number; correlates a pulled request with its
    /// pushed response.
    pub sequence: u32,
    /// Count of valid bytes the library placed in `buffer` (request payload
    /// size, or expected receive length).
    pub length_in: u16,
    /// Count of valid bytes the shim is returning in `buffer`.
    pub length_out: u16,
    /// Fixed payload buffer; both directions reuse the same storage.
    pub buffer: [u8; BUFFER_SIZE],
}

impl TransferFrame {
    /// A zero-initialized frame.
    pub fn zeroed() -> Self {
        Self {
            sequence: 0,
            length_in: 0,
            length_out: 0,
            buffer: [0u8; BUFFER_SIZE],
        }
    }

    /// Build a request frame the way the driver library would: `sequence`
    /// set, `payload` copied in, `length_in` set to its size.
    pub fn request(sequence: u32, payload: &[u8]) -> Result<Self> {
        if payload.len() > BUFFER_SIZE {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: BUFFER_SIZE,
            });
        }
        let mut frame = Self::zeroed();
        frame.sequence = sequence;
        frame.length_in = payload.len() as u16;
        frame.buffer[..payload.len()].copy_from_slice(payload);
        Ok(frame)
    }

    /// The valid request bytes (first `length_in` bytes of the buffer).
    ///
    /// A `length_in` beyond the buffer size is truncated to the buffer; the
    /// boundary adapter rejects such frames before they get this far.
    pub fn request_payload(&self) -> &[u8] {
        let len = usize::from(self.length_in).min(BUFFER_SIZE);
        &self.buffer[..len]
    }

    /// The valid response bytes (first `length_out` bytes of the buffer).
    pub fn response_payload(&self) -> &[u8] {
        let len = usize::from(self.length_out).min(BUFFER_SIZE);
        &self.buffer[..len]
    }

    /// Copy a response payload into the buffer and set `length_out`.
    pub fn write_response(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > BUFFER_SIZE {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: BUFFER_SIZE,
            });
        }
        self.buffer[..payload.len()].copy_from_slice(payload);
        self.length_out = payload.len() as u16;
        Ok(())
    }

    /// Reset both valid-byte counts to zero after the payload is consumed.
    pub fn reset_lengths(&mut self) {
        self.length_in = 0;
        self.length_out = 0;
    }
}

impl Default for TransferFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl std::fmt::Debug for TransferFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferFrame")
            .field("sequence", &self.sequence)
            .field("length_in", &self.length_in)
            .field("length_out", &self.length_out)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_library_expectation() {
        // 4 + 2 + 2 + 256, C layout, no padding.
        assert_eq!(std::mem::size_of::<TransferFrame>(), 264);
        assert_eq!(std::mem::align_of::<TransferFrame>(), 4);
    }

    #[test]
    fn test_zeroed_frame() {
        let frame = TransferFrame::zeroed();
        assert_eq!(frame.sequence, 0);
        assert_eq!(frame.length_in, 0);
        assert_eq!(frame.length_out, 0);
        assert!(frame.buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_request_sets_lengths() {
        let frame = TransferFrame::request(7, &[3, 7, 0x30]).unwrap();
        assert_eq!(frame.sequence, 7);
        assert_eq!(frame.length_in, 3);
        assert_eq!(frame.length_out, 0);
        assert_eq!(frame.request_payload(), &[3, 7, 0x30]);
    }

    #[test]
    fn test_request_too_large() {
        let payload = [0u8; BUFFER_SIZE + 1];
        let result = TransferFrame::request(1, &payload);
        assert!(matches!(
            result,
            Err(FrameError::PayloadTooLarge { size: 257, max: 256 })
        ));
    }

    #[test]
    fn test_write_response_full_buffer() {
        let mut frame = TransferFrame::zeroed();
        let payload = [0xA5u8; BUFFER_SIZE];
        frame.write_response(&payload).unwrap();
        assert_eq!(frame.length_out as usize, BUFFER_SIZE);
        assert_eq!(frame.response_payload(), &payload[..]);
    }

    #[test]
    fn test_write_response_too_large() {
        let mut frame = TransferFrame::zeroed();
        let payload = [0u8; BUFFER_SIZE + 1];
        assert!(matches!(
            frame.write_response(&payload),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_reset_lengths() {
        let mut frame = TransferFrame::request(9, &[1, 2, 3]).unwrap();
        frame.write_response(&[4]).unwrap();
        frame.reset_lengths();
        assert_eq!(frame.length_in, 0);
        assert_eq!(frame.length_out, 0);
        // The buffer itself is not scrubbed; only the valid-byte counts.
        assert_eq!(frame.sequence, 9);
    }

    #[test]
    fn test_oversized_length_in_is_truncated_by_accessor() {
        let mut frame = TransferFrame::zeroed();
        frame.length_in = 1000;
        assert_eq!(frame.request_payload().len(), BUFFER_SIZE);
    }
}
