use std::sync::{Mutex, MutexGuard};

use authlink_channel::SerialChannel;
use authlink_hal::{Dispatcher, Status};
use tracing::{debug, warn};

use crate::bridge::{PointerBridge, PullRequestFn, PushResponseFn, RegisterCallbackFn};
use crate::error;

type ActiveShim = Dispatcher<PointerBridge, SerialChannel>;

/// The one process-wide shim instance.
///
/// A bare C function pointer carries no closure state, so the callback has
/// to reach the dispatcher through a global slot. The mutex also provides
/// the mutual exclusion required if the library ever dispatches from more
/// than one thread.
static SHIM: Mutex<Option<ActiveShim>> = Mutex::new(None);

fn shim_slot() -> MutexGuard<'static, Option<ActiveShim>> {
    match SHIM.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register the transport shim with the driver library and bring up the
/// serial channel.
///
/// Calls the library's `register` entry point with [`authlink_callback`]. A
/// non-zero status from the library is returned to the caller unchanged;
/// initialization must treat it as fatal rather than run without a working
/// transport. Binding twice is rejected.
#[no_mangle]
pub extern "C" fn authlink_bind(
    register: Option<RegisterCallbackFn>,
    pull: Option<PullRequestFn>,
    push: Option<PushResponseFn>,
) -> i32 {
    crate::ffi_boundary(Status::GenFail.as_raw(), || {
        error::clear_error_state();

        let (Some(register), Some(pull), Some(push)) = (register, pull, push) else {
            return error::set_invalid_argument("register, pull and push entry points cannot be null")
                .as_raw();
        };

        let mut slot = shim_slot();
        if slot.is_some() {
            error::set_error_message("transport already bound");
            return Status::GenFail.as_raw();
        }

        // SAFETY: `register` is a non-null library entry point; the callback
        // it receives stays valid for the process lifetime.
        let raw = unsafe { register(authlink_callback) };
        if raw != Status::Success.as_raw() {
            warn!(status = raw, "library rejected callback registration");
            error::set_error_message(format!("library rejected registration (status {raw:#x})"));
            return raw;
        }

        *slot = Some(Dispatcher::new(
            PointerBridge::new(pull, push),
            SerialChannel::new(),
        ));
        debug!("transport bound");
        Status::Success.as_raw()
    })
}

/// The transport callback the driver library invokes for every operation.
///
/// Routed straight into the dispatcher; panics are contained at this
/// boundary and reported as the permanent-failure status.
#[no_mangle]
pub extern "C" fn authlink_callback(selector: u32, sequence: u32, parameter: u32) -> i32 {
    crate::ffi_boundary(Status::GenFail.as_raw(), || {
        let mut slot = shim_slot();
        match slot.as_mut() {
            None => {
                warn!(selector, sequence, "callback with no transport bound");
                Status::CommFail.as_raw()
            }
            Some(shim) => shim.dispatch(selector, sequence, parameter).as_raw(),
        }
    })
}

/// Tear the transport down, finishing the channel exactly once.
///
/// Idempotent; must be reachable on every exit path of the owning process,
/// including error exits.
#[no_mangle]
pub extern "C" fn authlink_release() {
    crate::ffi_boundary((), || {
        if let Some(mut shim) = shim_slot().take() {
            shim.shutdown();
            debug!("transport released");
        }
    });
}
