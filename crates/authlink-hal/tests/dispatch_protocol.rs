//! End-to-end dispatch protocol tests over the simulated serial connection.
//!
//! These drive the dispatcher exactly the way the driver library would:
//! stage a request frame, invoke the callback entry point with
//! `(selector, sequence, parameter)`, and inspect the pushed response.

use std::collections::HashMap;

use authlink_channel::SerialChannel;
use authlink_frame::TransferFrame;
use authlink_hal::{Dispatcher, DriverBridge, Opcode, Status};

const WAKE: u32 = Opcode::Wake as u32;
const IDLE: u32 = Opcode::Idle as u32;
const SEND: u32 = Opcode::Send as u32;
const RECEIVE: u32 = Opcode::Receive as u32;

/// In-process stand-in for the driver library's request/response store.
#[derive(Default)]
struct LibraryStore {
    pending: HashMap<u32, TransferFrame>,
    responses: HashMap<u32, TransferFrame>,
}

impl LibraryStore {
    fn stage_request(&mut self, sequence: u32, payload: &[u8]) {
        let frame = TransferFrame::request(sequence, payload).expect("payload should fit");
        self.pending.insert(sequence, frame);
    }

    fn response(&self, sequence: u32) -> &TransferFrame {
        self.responses
            .get(&sequence)
            .expect("a response should have been pushed")
    }
}

impl DriverBridge for LibraryStore {
    fn pull_request(&mut self, sequence: u32) -> Result<TransferFrame, Status> {
        self.pending.get(&sequence).copied().ok_or(Status::GenFail)
    }

    fn push_response(&mut self, sequence: u32, frame: &TransferFrame) -> Status {
        self.responses.insert(sequence, *frame);
        Status::Success
    }
}

fn fresh_dispatcher() -> Dispatcher<LibraryStore, SerialChannel> {
    Dispatcher::new(LibraryStore::default(), SerialChannel::new())
}

#[test]
fn receive_single_byte_yields_diagnostic_constant() {
    let mut dispatcher = fresh_dispatcher();
    dispatcher.bridge_mut().stage_request(1, &[0]);

    assert_eq!(dispatcher.dispatch(RECEIVE, 1, 1), Status::Success);
    let response = dispatcher.bridge().response(1);
    assert_eq!(response.length_out, 1);
    assert_eq!(response.response_payload(), &[2]);
}

#[test]
fn receive_multi_byte_yields_ascending_pattern() {
    let mut dispatcher = fresh_dispatcher();
    dispatcher.bridge_mut().stage_request(2, &[0u8; 6]);

    assert_eq!(dispatcher.dispatch(RECEIVE, 2, 6), Status::Success);
    let response = dispatcher.bridge().response(2);
    assert_eq!(response.length_out, 6);
    assert_eq!(response.response_payload(), &[6, 1, 2, 3, 4, 5]);
}

#[test]
fn wake_reports_acknowledgment_length() {
    let mut dispatcher = fresh_dispatcher();

    assert_eq!(dispatcher.dispatch(WAKE, 1, 1500), Status::Success);
    let response = dispatcher.bridge().response(1);
    assert!(response.length_out > 0 && response.length_out <= 4);
    assert_eq!(response.length_in, 0);
}

#[test]
fn send_with_matching_pull_succeeds() {
    // Fresh channel, SEND with sequence=5, parameter=3, staged frame
    // matching both: zero-byte ack, SUCCESS.
    let mut dispatcher = fresh_dispatcher();
    dispatcher.bridge_mut().stage_request(5, &[3, 7, 0x30]);

    assert_eq!(dispatcher.dispatch(SEND, 5, 3), Status::Success);
}

#[test]
fn mismatched_pull_is_bad_param_without_channel_io() {
    let mut dispatcher = fresh_dispatcher();
    dispatcher.bridge_mut().stage_request(5, &[3, 7, 0x30]);

    // Length disagrees with the staged frame.
    assert_eq!(dispatcher.dispatch(SEND, 5, 4), Status::BadParam);
    // And so does a receive for the same staged frame.
    assert_eq!(dispatcher.dispatch(RECEIVE, 5, 9), Status::BadParam);
    // No channel I/O happened: the connection counted nothing.
    assert_eq!(dispatcher.channel().unwrap().transactions(), 0);
}

#[test]
fn unknown_selector_is_unimplemented() {
    let mut dispatcher = fresh_dispatcher();
    assert_eq!(dispatcher.dispatch(99, 1, 0), Status::Unimplemented);
    assert_eq!(dispatcher.channel().unwrap().transactions(), 0);
}

#[test]
fn channel_goes_dark_after_four_transactions() {
    let mut dispatcher = fresh_dispatcher();
    dispatcher.bridge_mut().stage_request(5, &[3, 7, 0x30]);

    // Transaction 1: a clean send.
    assert_eq!(dispatcher.dispatch(SEND, 5, 3), Status::Success);

    // Transactions 2-4: any mix of operations.
    dispatcher.bridge_mut().stage_request(6, &[0u8; 4]);
    assert_eq!(dispatcher.dispatch(RECEIVE, 6, 4), Status::Success);
    assert_eq!(dispatcher.dispatch(WAKE, 7, 0), Status::Success);
    assert_eq!(dispatcher.dispatch(IDLE, 8, 0), Status::Success);
    assert_eq!(dispatcher.channel().unwrap().transactions(), 4);

    // The 5th operation reports the permanent failure, even though idle
    // itself would have succeeded.
    assert_eq!(dispatcher.dispatch(IDLE, 9, 0), Status::GenFail);

    // Send and receive degrade the same way.
    dispatcher.bridge_mut().stage_request(10, &[1]);
    assert_eq!(dispatcher.dispatch(SEND, 10, 1), Status::GenFail);
    dispatcher.bridge_mut().stage_request(11, &[0]);
    assert_eq!(dispatcher.dispatch(RECEIVE, 11, 1), Status::GenFail);

    // Wake has no error path; it degrades to an empty acknowledgment.
    assert_eq!(dispatcher.dispatch(WAKE, 12, 0), Status::Success);
    assert_eq!(dispatcher.bridge().response(12).length_out, 0);
}

#[test]
fn shutdown_releases_channel_and_later_calls_comm_fail() {
    let mut dispatcher = fresh_dispatcher();
    dispatcher.shutdown();
    dispatcher.shutdown();

    dispatcher.bridge_mut().stage_request(1, &[1]);
    assert_eq!(dispatcher.dispatch(SEND, 1, 1), Status::CommFail);
    assert_eq!(dispatcher.dispatch(IDLE, 1, 0), Status::CommFail);
}

#[test]
fn full_exchange_round_trip() {
    let mut dispatcher = fresh_dispatcher();

    // wake, send a 3-byte command, read a 4-byte response
    assert_eq!(dispatcher.dispatch(WAKE, 1, 1500), Status::Success);
    dispatcher.bridge_mut().stage_request(2, &[3, 7, 0x30]);
    assert_eq!(dispatcher.dispatch(SEND, 2, 3), Status::Success);
    dispatcher.bridge_mut().stage_request(3, &[0u8; 4]);
    assert_eq!(dispatcher.dispatch(RECEIVE, 3, 4), Status::Success);

    let response = dispatcher.bridge().response(3);
    assert_eq!(response.sequence, 3);
    assert_eq!(response.length_in, 0);
    assert_eq!(response.response_payload(), &[4, 1, 2, 3]);
}
