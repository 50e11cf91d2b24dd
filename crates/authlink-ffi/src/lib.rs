//! authlink-ffi: C-ABI adapter between the cryptoauth driver library and
//! the transport shim.
//!
//! The driver library registers [`authlink_callback`] through its own entry
//! point and then invokes it for every transport operation; the adapter
//! routes each call into the safe dispatcher core. All raw-pointer handling
//! lives in this crate, and no panic ever crosses the boundary.

mod bridge;
mod error;
mod shim;

use std::panic::AssertUnwindSafe;

pub use bridge::{DispatchCallbackFn, PullRequestFn, PushResponseFn, RegisterCallbackFn};
pub use shim::{authlink_bind, authlink_callback, authlink_release};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Last error message recorded on this thread, as a NUL-terminated string.
///
/// Empty when no error has been recorded since the last bind.
#[no_mangle]
pub extern "C" fn authlink_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
