/// Errors that can occur when filling a transfer frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit in the fixed 256-byte buffer.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
