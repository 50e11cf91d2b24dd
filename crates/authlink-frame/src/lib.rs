//! Fixed-layout transfer frame for the cryptoauth driver library boundary.
//!
//! One [`TransferFrame`] carries one in-flight exchange between the driver
//! library and the transport shim. The layout is fixed:
//! - A 4-byte request sequence number
//! - A 2-byte little-endian valid-byte count, library → shim
//! - A 2-byte little-endian valid-byte count, shim → library
//! - A 256-byte payload buffer shared by both directions
//!
//! The driver library reads and writes this structure byte-for-byte across
//! the callback boundary, so the layout must never change.

pub mod error;
pub mod frame;

pub use error::{FrameError, Result};
pub use frame::{TransferFrame, BUFFER_SIZE};
