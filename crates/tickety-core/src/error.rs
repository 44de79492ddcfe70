use std::{fmt, io};

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TicketNotFound,
    AmbiguousId,
    InvalidTitle,
    StorageUnavailable,
    StorageWriteFailed,
    CorruptState,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TicketNotFound => "E2001",
            Self::AmbiguousId => "E2004",
            Self::InvalidTitle => "E2006",
            Self::StorageUnavailable => "E5003",
            Self::StorageWriteFailed => "E5001",
            Self::CorruptState => "E3003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TicketNotFound => "Ticket not found",
            Self::AmbiguousId => "Ambiguous ticket ID",
            Self::InvalidTitle => "Invalid ticket title",
            Self::StorageUnavailable => "Ticket storage unavailable",
            Self::StorageWriteFailed => "Ticket storage write failed",
            Self::CorruptState => "Corrupt persisted ticket state",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the tickety config.toml and retry."),
            Self::TicketNotFound => Some("Run `tk list` to see existing ticket IDs."),
            Self::AmbiguousId => Some("Use a longer ID prefix to disambiguate."),
            Self::InvalidTitle => Some("Titles need at least 3 characters."),
            Self::StorageUnavailable => {
                Some("Check that the data directory exists and is writable.")
            }
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::CorruptState => {
                Some("Stored tickets could not be read; `tk reset` starts over from the seed set.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by key-value slots and the ticket repository.
///
/// The store never surfaces these; they are logged and absorbed. The fallible
/// repository methods return them for callers that want to inspect failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error while reading or writing a slot.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The collection could not be encoded as JSON.
    #[error("failed to serialize tickets: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored value exists but is not a well-formed ticket collection.
    #[error("corrupt value under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// The slot refused the operation (quota exceeded, disabled storage).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Machine-readable code associated with this storage error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::Serialize(_) => ErrorCode::StorageWriteFailed,
            Self::Corrupt { .. } => ErrorCode::CorruptState,
            Self::Unavailable(_) => ErrorCode::StorageUnavailable,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
