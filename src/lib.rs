//! # zoho-config
//!
//! Settings storage and authtoken generation for the Zoho CRM API.
//!
//! The settings are four values kept under the `zoho.zohoconfig` namespace: the API authtoken,
//! the Zoho username, the Zoho password and the state of the "Generate New Authtoken" fieldset.
//! When the authtoken is left empty, the username and password can be traded for a new one.
//!
//! You can read more about authtokens here:
//! [https://www.zoho.com/crm/help/api/using-authentication-token.html](https://www.zoho.com/crm/help/api/using-authentication-token.html)
//!
//! ### Example
//!
//! ```no_run
//! use zoho_config::{form, Client, JsonFileStore, PasswordVault, ZohoConfig};
//!
//! // the stored password is encrypted with this 32 byte key
//! let vault = PasswordVault::from_key_bytes(&[0u8; 32]).unwrap();
//! let store = JsonFileStore::new("/var/lib/zoho", vault);
//! let client = Client::default();
//!
//! // leave the authtoken empty to generate a new one
//! let submission = ZohoConfig::new("", "user@example.com", "YOUR_PASSWORD");
//!
//! match form::submit(&store, Some(&client), submission) {
//!     Ok(outcome) => println!("{}", outcome.message()),
//!     Err(error) => println!("{}", form::error_message(&error)),
//! }
//!
//! let settings = form::load_settings(&store).unwrap();
//! println!("{}", settings.authtoken);
//! ```

mod client_error;
mod client;
mod config;
pub mod form;
pub mod response;
mod store;
mod token_record;
mod vault;

pub use client::{Client, TokenExchange, DEFAULT_TICKET_URL};
pub use client_error::ClientError;
pub use config::{Password, ZohoConfig, CONFIG_NAME, FORM_ID, MAX_FIELD_LENGTH};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use token_record::TokenRecord;
pub use vault::{PasswordVault, SealedPassword, KEY_LEN};
