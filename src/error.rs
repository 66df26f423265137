use std::fmt;

/// Failure talking to the unit over HTTP.
#[derive(Debug)]
pub enum TransportError {
    Http(reqwest::Error),
    Status(u16),
    /// Body was not valid UTF-8.
    Decode(std::string::FromUtf8Error),
    /// Every attempt failed; `last` is the final attempt's failure.
    Exhausted {
        attempts: u32,
        last: Box<TransportError>,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(e) => write!(f, "HTTP error: {e}"),
            TransportError::Status(code) => write!(f, "unexpected HTTP status {code}"),
            TransportError::Decode(e) => write!(f, "response body is not UTF-8: {e}"),
            TransportError::Exhausted { attempts, last } => {
                write!(f, "query failed after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Http(e) => Some(e),
            TransportError::Decode(e) => Some(e),
            TransportError::Exhausted { last, .. } => Some(last.as_ref()),
            TransportError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e)
    }
}

/// Why a status body could not be turned into device state.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedResponse {
    MissingSeparator(String),
    MissingKey(&'static str),
    InvalidNumber { key: &'static str, value: String },
    FanSpeedOutOfRange(i64),
}

impl fmt::Display for MalformedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedResponse::MissingSeparator(token) => {
                write!(f, "token without '=' separator: {token:?}")
            }
            MalformedResponse::MissingKey(key) => write!(f, "missing key: {key}"),
            MalformedResponse::InvalidNumber { key, value } => {
                write!(f, "{key} is not a number: {value:?}")
            }
            MalformedResponse::FanSpeedOutOfRange(v) => {
                write!(f, "fanspeed {v} outside 1..=3")
            }
        }
    }
}

impl std::error::Error for MalformedResponse {}

#[derive(Debug)]
pub enum RefreshError {
    Transport(TransportError),
    Malformed(MalformedResponse),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::Transport(e) => write!(f, "refresh failed: {e}"),
            RefreshError::Malformed(e) => write!(f, "malformed status response: {e}"),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::Transport(e) => Some(e),
            RefreshError::Malformed(e) => Some(e),
        }
    }
}

impl From<TransportError> for RefreshError {
    fn from(e: TransportError) -> Self {
        RefreshError::Transport(e)
    }
}

impl From<MalformedResponse> for RefreshError {
    fn from(e: MalformedResponse) -> Self {
        RefreshError::Malformed(e)
    }
}

#[derive(Debug)]
pub enum CommandError {
    Transport(TransportError),
    InvalidMode(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Transport(e) => write!(f, "command failed: {e}"),
            CommandError::InvalidMode(mode) => write!(f, "invalid mode: {mode}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Transport(e) => Some(e),
            CommandError::InvalidMode(_) => None,
        }
    }
}

impl From<TransportError> for CommandError {
    fn from(e: TransportError) -> Self {
        CommandError::Transport(e)
    }
}

/// Failure constructing a client.
#[derive(Debug)]
pub enum BuildError {
    Http(reqwest::Error),
    Io(std::io::Error),
    /// Host does not form a valid URL authority.
    InvalidHost(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Http(e) => write!(f, "failed to build HTTP client: {e}"),
            BuildError::Io(e) => write!(f, "failed to open message log: {e}"),
            BuildError::InvalidHost(host) => write!(f, "invalid host: {host:?}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Http(e) => Some(e),
            BuildError::Io(e) => Some(e),
            BuildError::InvalidHost(_) => None,
        }
    }
}

impl From<reqwest::Error> for BuildError {
    fn from(e: reqwest::Error) -> Self {
        BuildError::Http(e)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        BuildError::Io(e)
    }
}
