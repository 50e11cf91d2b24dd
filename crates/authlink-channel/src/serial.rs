use authlink_frame::TransferFrame;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, Received};

/// Wake acknowledgment the simulated device answers with.
const WAKE_ACK: [u8; 4] = [0x04, 0x11, 0x33, 0x43];

/// Diagnostic byte returned for single-byte reads.
const DIAG_BYTE: u8 = 0x02;

/// Simulated serial connection to the co-processor.
///
/// Answers receives with a synthetic test pattern: a single-byte read yields
/// the diagnostic byte `2`; an `n`-byte read yields `n` followed by the
/// ascending sequence `1, 2, …, n-1`.
///
/// The connection expires after [`Self::FATAL_THRESHOLD`] completed
/// primitive calls: every call after that reports the permanent failure,
/// whatever the primitive would normally have produced. This is a deliberate
/// fault-injection point for the dispatcher's fatal-error path and is never
/// bypassed or reset.
#[derive(Debug, Default)]
pub struct SerialChannel {
    /// Copy of the last frame accepted by `send`, consumed by the next
    /// `receive`. The dispatch protocol does not require the correlation;
    /// the copy exists so a channel implementation that needs it has it.
    pending_request: Option<TransferFrame>,
    /// Completed primitive calls on this connection.
    transaction_count: u32,
    finished: bool,
}

impl SerialChannel {
    /// Transaction count at which the connection reports permanent failure.
    pub const FATAL_THRESHOLD: u32 = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Completed primitive calls so far.
    pub fn transactions(&self) -> u32 {
        self.transaction_count
    }

    /// Whether a sent request is waiting to be consumed by a receive.
    pub fn has_pending_request(&self) -> bool {
        self.pending_request.is_some()
    }

    fn expired(&self) -> Result<()> {
        if self.transaction_count >= Self::FATAL_THRESHOLD {
            return Err(ChannelError::Expired {
                transactions: self.transaction_count,
            });
        }
        Ok(())
    }

    fn pattern(expected_len: u16) -> Bytes {
        match expected_len {
            0 => Bytes::new(),
            1 => Bytes::from_static(&[DIAG_BYTE]),
            n => {
                let mut out = Vec::with_capacity(usize::from(n));
                out.push(n as u8);
                out.extend((1..n).map(|x| x as u8));
                Bytes::from(out)
            }
        }
    }
}

impl Channel for SerialChannel {
    fn wake(&mut self) -> Option<Bytes> {
        // Wake has no error path; an expired connection simply stops
        // acknowledging.
        if self.expired().is_err() {
            warn!(
                transactions = self.transaction_count,
                "wake on expired connection"
            );
            return None;
        }
        self.transaction_count += 1;
        debug!(transactions = self.transaction_count, "wake acknowledged");
        Some(Bytes::from_static(&WAKE_ACK))
    }

    fn idle(&mut self) -> Result<()> {
        self.expired()?;
        self.transaction_count += 1;
        debug!(transactions = self.transaction_count, "device idled");
        Ok(())
    }

    fn send(&mut self, frame: &TransferFrame) -> Result<u16> {
        self.expired()?;
        self.pending_request = Some(*frame);
        self.transaction_count += 1;
        debug!(
            sequence = frame.sequence,
            length = frame.length_in,
            transactions = self.transaction_count,
            "request accepted"
        );
        Ok(0)
    }

    fn receive(&mut self, expected_len: u16) -> Result<Received> {
        self.expired()?;
        if self.pending_request.take().is_none() {
            warn!("receive with no request on the line");
        }
        let bytes = Self::pattern(expected_len);
        self.transaction_count += 1;
        debug!(
            expected = expected_len,
            got = bytes.len(),
            transactions = self.transaction_count,
            "response produced"
        );
        Ok(Received {
            reported_len: bytes.len() as u16,
            bytes,
        })
    }

    fn finish(&mut self) {
        if self.finished {
            debug!("serial connection already finished");
            return;
        }
        self.finished = true;
        self.pending_request = None;
        debug!(
            transactions = self.transaction_count,
            "serial connection finished"
        );
    }
}
