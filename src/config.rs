//! The settings saved by the Zoho configuration form.

use crate::client_error::ClientError;
use serde_json::Value;
use std::fmt;
use zeroize::Zeroize;

/// Name of the settings namespace the configuration is stored under.
pub const CONFIG_NAME: &str = "zoho.zohoconfig";

/// Identifier of the configuration form.
pub const FORM_ID: &str = "zoho_config_form";

/// Maximum number of characters accepted in the authtoken, username and password fields.
pub const MAX_FIELD_LENGTH: usize = 64;

/// A Zoho account password. Redacted in `Debug` and `Display`, and wiped from memory on drop.
#[derive(Clone, Default, PartialEq)]
pub struct Password(String);

impl Password {
    pub fn new<S: Into<String>>(password: S) -> Password {
        Password(password.into())
    }

    /// Get the raw password. Only the token request should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Password {
        Password::new(password)
    }
}

/// Every value stored in the `zoho.zohoconfig` namespace.
///
/// Empty strings mean the field was never filled in. `generate_new_authtoken` is whatever the
/// form sent for the "Generate New Authtoken" fieldset; it is stored untouched.
///
/// Not serializable on its own; each store decides how the password is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZohoConfig {
    pub authtoken: String,
    pub username: String,
    pub password: Password,
    pub generate_new_authtoken: Value,
}

impl ZohoConfig {
    pub fn new<S: Into<String>>(authtoken: S, username: S, password: S) -> ZohoConfig {
        ZohoConfig {
            authtoken: authtoken.into(),
            username: username.into(),
            password: Password::new(password),
            generate_new_authtoken: Value::Null,
        }
    }

    /// Check the length limits of the text fields.
    pub fn validate(&self) -> Result<(), ClientError> {
        check_length("zoho_api_authtoken", &self.authtoken)?;
        check_length("zoho_username_email", &self.username)?;
        check_length("zoho_password", self.password.expose())?;

        Ok(())
    }

    /// Check that both credentials needed to generate a token were filled in.
    pub fn validate_credentials(&self) -> Result<(), ClientError> {
        require("zoho_username_email", &self.username)?;
        require("zoho_password", self.password.expose())?;

        Ok(())
    }
}

fn check_length(field: &str, value: &str) -> Result<(), ClientError> {
    let length = value.chars().count();

    if length > MAX_FIELD_LENGTH {
        return Err(ClientError::Validation(format!(
            "{} cannot be longer than {} characters but is currently {} characters long",
            field, MAX_FIELD_LENGTH, length
        )));
    }

    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), ClientError> {
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{} field is required", field)));
    }

    Ok(())
}
