use crate::client_error::ClientError;
use crate::response;
use crate::token_record::TokenRecord;
use log::{debug, info, warn};
use std::time::Duration;

/// Default network timeout for API requests.
const DEFAULT_TIMEOUT: u64 = 30;

/// Ticket server used when no other base URL is given.
pub const DEFAULT_TICKET_URL: &str = "https://accounts.zoho.com/";

/// Path of the authtoken endpoint, relative to the ticket server.
const AUTHTOKEN_PATH: &str = "apiauthtoken/nb/create";

/// Scope requested for generated tokens.
const CRM_SCOPE: &str = "ZohoCRM/crmapi";

/// Anything able to trade a Zoho username and password for an authtoken.
///
/// `Client` is the real implementation. The settings form only depends on this trait, so it
/// can be driven without a network.
pub trait TokenExchange {
    fn generate_authtoken(&self, username: &str, password: &str) -> Result<TokenRecord, ClientError>;
}

pub struct Client {
    ticket_url: String,
    timeout: u64,
}

impl Client {
    /// Create a new client talking to the given ticket server.
    pub fn new(ticket_url: &str) -> Client {
        let mut ticket_url = ticket_url.to_string();

        if !ticket_url.ends_with('/') {
            ticket_url.push('/');
        }

        Client {
            ticket_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for Client {
    fn default() -> Client {
        Client::new(DEFAULT_TICKET_URL)
    }
}

impl Client {
    /// Get the timeout for API requests.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Set the timeout for API requests.
    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    /// Get the ticket server base URL. Always ends with a `/`.
    pub fn ticket_url(&self) -> &str {
        &self.ticket_url
    }
}

impl Client {
    /// Build the full authtoken request URL.
    fn authtoken_url(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let params = [
            ("SCOPE", CRM_SCOPE),
            ("EMAIL_ID", username),
            ("PASSWORD", password),
        ];

        Ok(format!(
            "{}{}?{}",
            self.ticket_url,
            AUTHTOKEN_PATH,
            serde_urlencoded::to_string(&params)?
        ))
    }

    /// Generate a new authtoken from a Zoho username and password.
    ///
    /// The credentials are only sent to the ticket server; nothing is stored.
    pub fn generate_authtoken(&self, username: &str, password: &str) -> Result<TokenRecord, ClientError> {
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(String::from(
                "A username and password are required to generate an authtoken",
            )));
        }

        let url = self.authtoken_url(username, password)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .build()?;

        debug!("Requesting authtoken from {}{}", self.ticket_url, AUTHTOKEN_PATH);

        let mut response = client
            .get(url.as_str())
            .header("Accept", "text/plain")
            .send()?
            .error_for_status()?;

        let raw_response = response.text()?;

        match response::parse_ticket_body(&raw_response) {
            Ok(authtoken) => {
                let token = TokenRecord::new(authtoken);
                info!("Generated a new authtoken: {}", token.abbreviated());

                Ok(token)
            }
            Err(error) => {
                warn!("Authtoken request failed: {}", error);

                Err(error)
            }
        }
    }
}

impl TokenExchange for Client {
    fn generate_authtoken(&self, username: &str, password: &str) -> Result<TokenRecord, ClientError> {
        Client::generate_authtoken(self, username, password)
    }
}
