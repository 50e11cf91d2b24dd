use authlink_channel::{Channel, ChannelError, WAKE_ACK_MAX};
use authlink_frame::TransferFrame;
use tracing::{debug, warn};

use crate::bridge::DriverBridge;
use crate::status::Status;

/// Operation selectors the driver library dispatches with.
///
/// The numeric values are fixed by the library's callback ABI. Any other
/// selector maps to [`Status::Unimplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Wake = 1,
    Idle = 2,
    Send = 4,
    Receive = 5,
}

impl Opcode {
    pub fn from_selector(selector: u32) -> Option<Self> {
        match selector {
            1 => Some(Opcode::Wake),
            2 => Some(Opcode::Idle),
            4 => Some(Opcode::Send),
            5 => Some(Opcode::Receive),
            _ => None,
        }
    }
}

/// The callback-dispatch state machine.
///
/// Holds the bridge to the driver library and one channel slot; there is no
/// other state. The channel is injected at construction and taken out by
/// [`shutdown`](Self::shutdown), after which frame-exchanging operations
/// report [`Status::CommFail`] (no channel bound).
///
/// The dispatcher is invoked synchronously on the library's calling thread
/// and never re-entered; it requires no internal locking.
pub struct Dispatcher<B, C> {
    bridge: B,
    channel: Option<C>,
}

impl<B: DriverBridge, C: Channel> Dispatcher<B, C> {
    pub fn new(bridge: B, channel: C) -> Self {
        Self {
            bridge,
            channel: Some(channel),
        }
    }

    /// Whether a channel is currently bound.
    pub fn is_bound(&self) -> bool {
        self.channel.is_some()
    }

    /// The bound channel, if any.
    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// Entry point for every transport operation the library requests.
    ///
    /// `parameter` carries the wake delay for WAKE and the expected byte
    /// count for SEND/RECEIVE. Never panics toward the caller; every outcome
    /// is a [`Status`].
    pub fn dispatch(&mut self, selector: u32, sequence: u32, parameter: u32) -> Status {
        match Opcode::from_selector(selector) {
            Some(Opcode::Wake) => self.wake(sequence, parameter),
            Some(Opcode::Idle) => self.idle(sequence),
            Some(Opcode::Send) => self.send(sequence, parameter),
            Some(Opcode::Receive) => self.receive(sequence, parameter),
            None => {
                warn!(selector, sequence, "unknown operation selector");
                Status::Unimplemented
            }
        }
    }

    /// Release the channel, calling its `finish` exactly once.
    ///
    /// Safe to call repeatedly; later calls find the slot empty.
    pub fn shutdown(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            debug!("shutting down transport channel");
            channel.finish();
        }
    }

    fn wake(&mut self, sequence: u32, wake_delay: u32) -> Status {
        debug!(sequence, wake_delay, "wake");
        let mut frame = TransferFrame::zeroed();
        frame.sequence = sequence;

        let ack = self.channel.as_mut().and_then(|channel| channel.wake());
        match ack {
            Some(ack) => {
                let ack = &ack[..ack.len().min(WAKE_ACK_MAX)];
                // Fits by construction: WAKE_ACK_MAX is far below the
                // buffer size.
                let _ = frame.write_response(ack);
            }
            None => frame.length_out = 0,
        }

        // Channel failure during wake is not separately surfaced; the frame
        // simply carries no acknowledgment.
        self.bridge.push_response(sequence, &frame)
    }

    fn idle(&mut self, sequence: u32) -> Status {
        debug!(sequence, "idle");
        match self.channel.as_mut() {
            None => Status::CommFail,
            Some(channel) => match channel.idle() {
                Ok(()) => Status::Success,
                Err(err) => Self::channel_failure(&err),
            },
        }
    }

    fn send(&mut self, sequence: u32, tx_length: u32) -> Status {
        debug!(sequence, tx_length, "send");
        let mut frame = match self.pull_and_validate(sequence, tx_length) {
            Ok(frame) => frame,
            Err(status) => return status,
        };

        let outcome = self
            .channel
            .as_mut()
            .map(|channel| channel.send(&frame));
        frame.reset_lengths();

        match outcome {
            None => Status::CommFail,
            Some(Ok(0)) => Status::Success,
            Some(Ok(acked)) => {
                warn!(sequence, acked, "device acknowledged unexpected bytes");
                Status::CommFail
            }
            Some(Err(err)) => Self::channel_failure(&err),
        }
    }

    fn receive(&mut self, sequence: u32, rx_length: u32) -> Status {
        debug!(sequence, rx_length, "receive");
        let mut frame = match self.pull_and_validate(sequence, rx_length) {
            Ok(frame) => frame,
            Err(status) => return status,
        };

        let expected = frame.length_in;
        let outcome = self
            .channel
            .as_mut()
            .map(|channel| channel.receive(expected));
        frame.reset_lengths();

        let received = match outcome {
            None => return Status::CommFail,
            Some(Err(err)) => return Self::channel_failure(&err),
            Some(Ok(received)) => received,
        };

        if usize::from(received.reported_len) != received.bytes.len() {
            warn!(
                sequence,
                reported = received.reported_len,
                actual = received.bytes.len(),
                "channel reported length does not match payload"
            );
            return Status::CommFail;
        }
        if frame.write_response(&received.bytes).is_err() {
            warn!(sequence, len = received.bytes.len(), "response overflows frame");
            return Status::CommFail;
        }

        self.bridge.push_response(sequence, &frame)
    }

    /// The pull leg shared by SEND and RECEIVE.
    ///
    /// The frame pulled from the library must agree with the arguments this
    /// call was made with; a mismatch means the two legs of the exchange are
    /// desynchronized (a missed or duplicated callback) and aborts before
    /// any channel I/O.
    fn pull_and_validate(
        &mut self,
        sequence: u32,
        expected_length: u32,
    ) -> Result<TransferFrame, Status> {
        let frame = self.bridge.pull_request(sequence)?;
        if frame.sequence != sequence || u32::from(frame.length_in) != expected_length {
            warn!(
                sequence,
                pulled_sequence = frame.sequence,
                expected_length,
                pulled_length = frame.length_in,
                "pulled request does not match call arguments"
            );
            return Err(Status::BadParam);
        }
        Ok(frame)
    }

    fn channel_failure(err: &ChannelError) -> Status {
        if err.is_fatal() {
            warn!(error = %err, "channel reported permanent failure");
            Status::GenFail
        } else {
            warn!(error = %err, "channel reported transient failure");
            Status::CommFail
        }
    }
}
