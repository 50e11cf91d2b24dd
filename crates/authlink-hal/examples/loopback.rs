//! Drive the dispatcher over the simulated serial connection.
//!
//! Run with:
//!   cargo run --example loopback
//!
//! Stages request frames the way the driver library would, dispatches a
//! wake/send/receive/idle cycle, and keeps going until the connection
//! reports its permanent failure.

use std::collections::HashMap;

use authlink_channel::SerialChannel;
use authlink_frame::TransferFrame;
use authlink_hal::{Dispatcher, DriverBridge, Opcode, Status};

/// One-slot stand-in for the driver library's request/response store.
#[derive(Default)]
struct LoopbackStore {
    pending: HashMap<u32, TransferFrame>,
    last_response: Option<TransferFrame>,
}

impl DriverBridge for LoopbackStore {
    fn pull_request(&mut self, sequence: u32) -> Result<TransferFrame, Status> {
        self.pending.get(&sequence).copied().ok_or(Status::GenFail)
    }

    fn push_response(&mut self, _sequence: u32, frame: &TransferFrame) -> Status {
        self.last_response = Some(*frame);
        Status::Success
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    let mut dispatcher = Dispatcher::new(LoopbackStore::default(), SerialChannel::new());
    let mut sequence = 0u32;

    loop {
        sequence += 1;
        let status = dispatcher.dispatch(Opcode::Wake as u32, sequence, 1500);
        eprintln!("wake    seq {sequence} -> {status:?}");

        sequence += 1;
        let command = [3, 7, 0x30]; // word address, count, op code
        dispatcher
            .bridge_mut()
            .pending
            .insert(sequence, TransferFrame::request(sequence, &command).unwrap());
        let status = dispatcher.dispatch(Opcode::Send as u32, sequence, command.len() as u32);
        eprintln!("send    seq {sequence} -> {status:?}");
        if status == Status::GenFail {
            break;
        }

        sequence += 1;
        dispatcher
            .bridge_mut()
            .pending
            .insert(sequence, TransferFrame::request(sequence, &[0u8; 4]).unwrap());
        let status = dispatcher.dispatch(Opcode::Receive as u32, sequence, 4);
        if let Some(response) = dispatcher.bridge().last_response {
            eprintln!(
                "receive seq {sequence} -> {status:?} payload {:02X?}",
                response.response_payload()
            );
        }
        if status == Status::GenFail {
            break;
        }

        sequence += 1;
        let status = dispatcher.dispatch(Opcode::Idle as u32, sequence, 0);
        eprintln!("idle    seq {sequence} -> {status:?}");
        if status == Status::GenFail {
            break;
        }
    }

    eprintln!("connection expired; shutting down");
    dispatcher.shutdown();
}
