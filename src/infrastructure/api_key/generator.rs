//! API Key generation
//!
//! Keys are a fixed prefix followed by random ASCII alphanumerics.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Default prefix for generated keys
pub const DEFAULT_KEY_PREFIX: &str = "sk-";

/// Default number of random characters after the prefix
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Generator for API key secrets
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys
    prefix: String,
    /// Number of random characters to generate
    length: usize,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            length: DEFAULT_KEY_LENGTH,
        }
    }

    /// Set the number of random characters
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key secret
    pub fn generate(&self) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();

        format!("{}{}", self.prefix, random)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
