use thiserror::Error;

/// Errors raised by the power-law pipeline.
///
/// Every variant is terminal for the current invocation: callers retry on the
/// next scheduled run instead of patching over partial results. A
/// duplicate-date append is a defined no-op and never reaches this type.
#[derive(Debug, Error)]
pub enum PowerLawError {
    /// The price feed could not deliver a clean (date, price) pair.
    #[error("price fetch failed: {0}")]
    FetchFailed(String),

    /// A persisted row could not be turned into a valid observation.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Fewer than 2 usable observations remained after filtering.
    #[error("insufficient data: {got} valid observation(s), need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// All log-day values are identical, so the regression slope is undefined.
    #[error("degenerate input: zero variance on the log-day axis")]
    DegenerateInput,

    /// A required credential was absent from the feed configuration.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The persisted-series store or report sink failed.
    #[error("store error: {0}")]
    Store(String),
}

impl PowerLawError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<std::io::Error> for PowerLawError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = PowerLawError::InsufficientData { got: 1, need: 2 };
        assert_eq!(
            err.to_string(),
            "insufficient data: 1 valid observation(s), need at least 2"
        );

        let err = PowerLawError::malformed("row 3: bad price");
        assert_eq!(err.to_string(), "malformed record: row 3: bad price");
    }

    #[test]
    fn test_io_error_maps_to_store() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: PowerLawError = io.into();
        assert!(matches!(err, PowerLawError::Store(_)));
    }
}
