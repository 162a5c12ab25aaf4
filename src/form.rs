//! The settings form: loading, validating and saving the Zoho configuration.
//!
//! These are plain functions. The store and, when tokens should be generated, a
//! `TokenExchange` are handed in by the caller.

use crate::client::TokenExchange;
use crate::client_error::ClientError;
use crate::config::{ZohoConfig, CONFIG_NAME};
use crate::store::SettingsStore;
use crate::token_record::TokenRecord;
use log::{debug, warn};

/// Whether the settings were ever saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsState {
    Unconfigured,
    Configured,
}

/// Result of a successful form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// The settings as they were saved.
    pub config: ZohoConfig,

    /// The token generated during the submission, if one was.
    pub generated: Option<TokenRecord>,
}

impl SubmitOutcome {
    /// Notice to show the user after the submission.
    pub fn message(&self) -> String {
        match &self.generated {
            Some(token) => format!("Successfully generated a new Authtoken : {}", token.authtoken),
            None => String::from("The configuration options have been saved."),
        }
    }
}

pub fn settings_state<S: SettingsStore + ?Sized>(store: &S) -> Result<SettingsState, ClientError> {
    match store.load(CONFIG_NAME)? {
        Some(_) => Ok(SettingsState::Configured),
        None => Ok(SettingsState::Unconfigured),
    }
}

/// Load the last saved settings, or empty defaults when nothing was saved yet.
pub fn load_settings<S: SettingsStore + ?Sized>(store: &S) -> Result<ZohoConfig, ClientError> {
    Ok(store.load(CONFIG_NAME)?.unwrap_or_default())
}

/// Validate and save all four fields as one unit.
pub fn save_settings<S: SettingsStore + ?Sized>(store: &S, config: &ZohoConfig) -> Result<(), ClientError> {
    config.validate()?;
    store.save(CONFIG_NAME, config)?;

    debug!("Saved {} settings", CONFIG_NAME);

    Ok(())
}

/// Handle a submitted settings form.
///
/// With an `exchange` and an empty authtoken field, the username and password become required
/// and are traded for a new token, which replaces the authtoken field before saving. A filled-in
/// authtoken is saved as is. Without an `exchange` the submission is only validated and saved.
///
/// The length limit applies to what was submitted. A generated token is saved whatever its
/// length, so it is never lost after the ticket server issued it.
///
/// On any error nothing is saved and the previous settings stay in place.
pub fn submit<S: SettingsStore + ?Sized>(
    store: &S,
    exchange: Option<&dyn TokenExchange>,
    submission: ZohoConfig,
) -> Result<SubmitOutcome, ClientError> {
    let mut config = submission;
    config.validate()?;

    let mut generated = None;

    if let Some(exchange) = exchange {
        if config.authtoken.is_empty() {
            config.validate_credentials()?;

            let token = exchange
                .generate_authtoken(&config.username, config.password.expose())
                .map_err(|error| {
                    warn!("Not saving {} settings: {}", CONFIG_NAME, error);
                    error
                })?;

            config.authtoken = token.authtoken.clone();
            generated = Some(token);
        }
    }

    store.save(CONFIG_NAME, &config)?;

    debug!("Saved {} settings", CONFIG_NAME);

    Ok(SubmitOutcome { config, generated })
}

/// Form-level notice for a failed submission.
pub fn error_message(error: &ClientError) -> String {
    format!(
        "There was an error: {}. Please resolve the error and try again.",
        error
    )
}
