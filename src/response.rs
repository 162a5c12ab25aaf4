//! Parsing of the plaintext body returned by the ticket server.
//!
//! A successful body looks like this:
//!
//! ```text
//! #
//! #Mon Oct 19 10:00:00 PDT 2026
//! AUTHTOKEN=bad18eba1ff45jk7858b8ae88a77fa30
//! RESULT=TRUE
//! ```
//!
//! A failed one carries a different key on the same line, e.g. `CAUSE=INVALID_PASSWORD`.

use crate::client_error::ClientError;

/// Key Zoho uses on the result line when a token was issued.
pub const AUTHTOKEN_KEY: &str = "AUTHTOKEN";

/// Zero-based index of the `KEY=VALUE` line inside the body.
const RESULT_LINE: usize = 2;

/// The `KEY=VALUE` pair found on the result line.
#[derive(Debug, PartialEq)]
pub struct TicketLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> TicketLine<'a> {
    /// Find the result line inside `body` and split it on `=`.
    ///
    /// The value is the text between the first and second `=`; anything after a second `=` is
    /// dropped.
    pub fn from_body(body: &'a str) -> Result<TicketLine<'a>, ClientError> {
        let line = body
            .split('\n')
            .nth(RESULT_LINE)
            .map(|line| line.trim_end_matches('\r'))
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!(
                    "expected at least {} lines in the response",
                    RESULT_LINE + 1
                ))
            })?;

        let mut parts = line.split('=');
        let key = parts.next().unwrap_or_default();

        match parts.next() {
            Some(value) => Ok(TicketLine { key, value }),
            None => Err(ClientError::MalformedResponse(format!(
                "no '=' delimiter in line {:?}",
                line
            ))),
        }
    }

    /// Whether the server issued a token.
    pub fn is_authtoken(&self) -> bool {
        self.key == AUTHTOKEN_KEY
    }
}

/// Parse a ticket server body into the generated token.
///
/// Any key other than `AUTHTOKEN` is treated as a failure, with its value as the message.
pub fn parse_ticket_body(body: &str) -> Result<String, ClientError> {
    let line = TicketLine::from_body(body)?;

    if line.is_authtoken() {
        Ok(line.value.to_string())
    } else {
        Err(ClientError::AuthExchange(line.value.to_string()))
    }
}
