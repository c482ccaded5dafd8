use serde::Serialize;
use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
};
use thiserror::Error as ThisError;

// Vault entries holding the service principal the lake writer runs as.
pub const SECRET_SP_CLIENT_ID: &str = "dugout-dev-sp-client-id";
pub const SECRET_SP_CLIENT_SECRET: &str = "dugout-dev-sp-client-secret";
pub const SECRET_SP_TENANT_ID: &str = "dugout-dev-sp-tenant-id";

///
/// SecretProvider
///
/// One named secret at a time, the shape every vault client offers.
///

pub trait SecretProvider {
    fn secret(&self, name: &str) -> Result<String, ConfigError>;
}

///
/// StorageOptions
///
/// Credential set handed to the lake client, serialized under the option
/// keys object stores read from their environment. `Debug` redacts the
/// secret so the struct can appear in diagnostics.
///

#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct StorageOptions {
    #[serde(rename = "AZURE_STORAGE_ACCOUNT_NAME")]
    pub account_name: String,
    #[serde(rename = "AZURE_STORAGE_CLIENT_ID")]
    pub client_id: String,
    #[serde(rename = "AZURE_STORAGE_CLIENT_SECRET")]
    pub client_secret: String,
    #[serde(rename = "AZURE_STORAGE_TENANT_ID")]
    pub tenant_id: String,
}

impl StorageOptions {
    /// Assemble credentials from the three service-principal secrets.
    pub fn from_provider(
        provider: &dyn SecretProvider,
        account_name: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            account_name: account_name.to_string(),
            client_id: provider.secret(SECRET_SP_CLIENT_ID)?,
            client_secret: provider.secret(SECRET_SP_CLIENT_SECRET)?,
            tenant_id: provider.secret(SECRET_SP_TENANT_ID)?,
        })
    }
}

impl Debug for StorageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageOptions")
            .field("account_name", &self.account_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

///
/// MemorySecretProvider
///

#[derive(Debug, Default)]
pub struct MemorySecretProvider {
    secrets: BTreeMap<String, String>,
}

impl MemorySecretProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_string(), value.to_string());
        self
    }
}

impl SecretProvider for MemorySecretProvider {
    fn secret(&self, name: &str) -> Result<String, ConfigError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::SecretUnavailable {
                name: name.to_string(),
                reason: "not present in the provider".to_string(),
            })
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("secret '{name}' unavailable: {reason}")]
    SecretUnavailable { name: String, reason: String },
}

///
/// TESTS
///
