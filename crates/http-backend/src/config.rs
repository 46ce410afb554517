use std::fmt::Debug;

/// The Chat API deployment used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str =
    "https://apim.workato.com/workatop329/workato-chatapi-v1";

/// The user email attached to chat requests when none is configured.
pub const DEFAULT_USER_EMAIL: &str = "user@example.com";

/// Builder for [`ConsoleConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConsoleConfigBuilder {
    api_token: String,
    base_url: Option<String>,
    user_email: Option<String>,
}

impl ConsoleConfigBuilder {
    /// Creates a builder with the given API token.
    #[inline]
    pub fn with_api_token<S: Into<String>>(api_token: S) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: None,
            user_email: None,
        }
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the user email attached to chat requests.
    #[inline]
    pub fn with_user_email<S: Into<String>>(mut self, user_email: S) -> Self {
        self.user_email = Some(user_email.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ConsoleConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        ConsoleConfig {
            api_token: self.api_token,
            base_url: base_url.trim_end_matches('/').to_owned(),
            user_email: self
                .user_email
                .unwrap_or_else(|| DEFAULT_USER_EMAIL.to_string()),
        }
    }
}

impl Debug for ConsoleConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfigBuilder")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .finish()
    }
}

/// Configuration for the Chat API backend.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConsoleConfig {
    pub(crate) api_token: String,
    pub(crate) base_url: String,
    pub(crate) user_email: String,
}

impl ConsoleConfig {
    /// Returns the base URL every endpoint path is appended to.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the user email attached to chat requests.
    #[inline]
    pub fn user_email(&self) -> &str {
        &self.user_email
    }
}

impl Debug for ConsoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfigBuilder::with_api_token("secret").build();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.user_email(), DEFAULT_USER_EMAIL);
    }

    #[test]
    fn test_overrides_and_redaction() {
        let config = ConsoleConfigBuilder::with_api_token("secret")
            .with_base_url("http://localhost:8080/api/")
            .with_user_email("ops@example.com")
            .build();
        assert_eq!(config.base_url(), "http://localhost:8080/api");
        assert_eq!(config.user_email(), "ops@example.com");

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
