use std::fmt;
use std::io;

/// Various errors returned while generating a token or saving settings.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The request could not be completed, or the ticket server answered with a non-success
    /// status.
    Network(String),

    /// The request did not complete within the client's timeout.
    Timeout(String),

    /// The ticket server answered, but with something other than an `AUTHTOKEN` line. Holds
    /// the value the server sent back, e.g. `INVALID_PASSWORD`.
    AuthExchange(String),

    /// The response body did not have the expected `KEY=VALUE` line.
    MalformedResponse(String),

    /// A submitted field was missing or too long.
    Validation(String),

    /// The settings store could not be read or written.
    Storage(String),
}

impl ClientError {
    /// Return the underlying error message as a string.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Network(error) => error,
            ClientError::Timeout(error) => error,
            ClientError::AuthExchange(error) => error,
            ClientError::MalformedResponse(error) => error,
            ClientError::Validation(error) => error,
            ClientError::Storage(error) => error,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_urlencoded::ser::Error> for ClientError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
