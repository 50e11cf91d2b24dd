/// Status codes returned to the driver library across the callback boundary.
///
/// The numeric values are the library's own wire values and are part of the
/// ABI; the dispatcher converts every outcome, including contained panics,
/// into one of these and returns it normally.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation completed.
    Success = 0x00,
    /// Permanent failure; retrying will not help.
    GenFail = 0xE1,
    /// Protocol contract violated (sequence or length desynchronization).
    BadParam = 0xE2,
    /// Transient communication problem; the library may retry.
    CommFail = 0xF0,
    /// Unknown operation selector.
    Unimplemented = 0xF5,
}

impl Status {
    /// Decode a raw library status code. Returns `None` for values outside
    /// the closed set.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0x00 => Some(Status::Success),
            0xE1 => Some(Status::GenFail),
            0xE2 => Some(Status::BadParam),
            0xF0 => Some(Status::CommFail),
            0xF5 => Some(Status::Unimplemented),
            _ => None,
        }
    }

    /// The raw value handed across the callback boundary.
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}
