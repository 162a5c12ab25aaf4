use serde::{Deserialize, Serialize};

/// Wrapper around a token generated by the Zoho ticket server.
///
/// Unless you are generating a token yourself through `Client::generate_authtoken()`, you
/// usually will not need to use this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub authtoken: String,
}

impl TokenRecord {
    pub fn new(authtoken: String) -> TokenRecord {
        TokenRecord { authtoken }
    }

    /// Get an abbreviated version of the token, safe to write to logs.
    pub fn abbreviated(&self) -> String {
        let chars: Vec<char> = self.authtoken.chars().collect();

        if chars.len() <= 8 {
            return "..".to_string();
        }

        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();

        format!("{}..{}", prefix, suffix)
    }
}
