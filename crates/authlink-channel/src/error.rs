/// Errors that can occur on a transport channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel has permanently failed; no further call will succeed.
    #[error("channel expired after {transactions} transactions")]
    Expired { transactions: u32 },

    /// An I/O error occurred on the underlying medium.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChannelError {
    /// Whether this failure is permanent.
    ///
    /// Fatal failures map to the driver library's permanent-failure status;
    /// everything else is reported as a transient communication problem the
    /// library may retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChannelError::Expired { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
