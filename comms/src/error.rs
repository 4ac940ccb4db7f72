use std::{
    error::Error,
    fmt::{self, Display},
};

/// Failures of an outbound call to another service.
///
/// Every variant means the same thing to the caller: that peer did not
/// take part in the operation. The variants only exist so the caller can
/// report *why*.
#[derive(Debug)]
pub enum PeerErr {
    /// The call did not finish within its timeout.
    Timeout { url: String },
    /// The connection could not be established or was dropped.
    Unreachable { url: String, reason: String },
    /// The peer answered with a non-success status code.
    Rejected { url: String, status: u16, body: String },
    /// The peer answered 2xx but the body could not be understood.
    InvalidResponse { url: String, reason: String },
}

impl Display for PeerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerErr::Timeout { url } => write!(f, "call to {url} timed out"),
            PeerErr::Unreachable { url, reason } => write!(f, "{url} is unreachable: {reason}"),
            PeerErr::Rejected { url, status, body } => {
                write!(f, "{url} rejected the call with status {status}: {body}")
            }
            PeerErr::InvalidResponse { url, reason } => {
                write!(f, "{url} sent an invalid response: {reason}")
            }
        }
    }
}

impl Error for PeerErr {}

/// Failures while turning the textual wire form back into artifacts.
#[derive(Debug)]
pub enum CodecErr {
    Base64(base64::DecodeError),
    Json(serde_json::Error),
}

impl Display for CodecErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecErr::Base64(e) => write!(f, "invalid base64 payload: {e}"),
            CodecErr::Json(e) => write!(f, "invalid bundle layout: {e}"),
        }
    }
}

impl Error for CodecErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecErr::Base64(e) => Some(e),
            CodecErr::Json(e) => Some(e),
        }
    }
}

impl From<base64::DecodeError> for CodecErr {
    fn from(value: base64::DecodeError) -> Self {
        Self::Base64(value)
    }
}

impl From<serde_json::Error> for CodecErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
