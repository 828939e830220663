//! URL utilities for consistent URL handling

use url::Url;

use crate::errors::{AppError, AppResult};

/// URL utilities for consistent URL handling
pub struct UrlUtils;

const SENSITIVE_PARAMS: [&str; 6] = ["username", "password", "user", "pass", "pwd", "passwd"];

impl UrlUtils {
    /// Parse an absolute http(s) URL, rejecting anything a worker could not fetch
    pub fn parse_http_url(url: &str) -> AppResult<Url> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| AppError::configuration(format!("Invalid URL '{url}': {e}")))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(AppError::configuration(format!(
                "Unsupported URL scheme '{scheme}' in '{}'",
                Self::obfuscate_credentials(url)
            ))),
        }
    }

    /// Hide credentials in user info and well-known query parameters so the URL
    /// can be logged
    pub fn obfuscate_credentials(url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            let _ = parsed.set_username("****");
            let _ = parsed.set_password(Some("****"));
        }

        if parsed.query().is_some() {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(key, value)| {
                    let hidden = SENSITIVE_PARAMS
                        .iter()
                        .any(|param| key.eq_ignore_ascii_case(param));
                    let value = if hidden { "****".to_string() } else { value.into_owned() };
                    (key.into_owned(), value)
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
        }

        parsed.to_string()
    }
}
