use crate::error::SecretError;
use sdeck_domain::Naming;
use sdeck_domain::config::SecretsConfig;
use sdeck_domain::constants::API_KEY_FIELD;
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic};
use serde_json::{Value, json};
use tracing::info;

const SECRET_ID: &str = "ApiKeySecret";

/// Letters outside `a-f`. Together with the excluded uppercase and punctuation classes this
/// leaves lowercase hex digits only.
const NON_HEX_LOWERCASE: &str = "ghijklmnopqrstuvwxyz";

/// Reference to the provisioned credential. Never carries the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHandle {
    secret: LogicalId,
    entry: String,
}

impl CredentialHandle {
    /// Logical id of the declared secret resource.
    #[must_use]
    pub const fn secret(&self) -> &LogicalId {
        &self.secret
    }

    /// Physical secret name.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Storage reference of the secret, the value published as `api-key-secret-arn`.
    #[must_use]
    pub fn arn(&self) -> Value {
        intrinsic::reference(&self.secret)
    }

    /// Runtime reference to the `apiKey` field: `<secret-ref>:apiKey::`.
    #[must_use]
    pub fn field_reference(&self) -> Value {
        intrinsic::join(":", [self.arn(), json!(format!("{API_KEY_FIELD}::"))])
    }
}

/// Declares the stack's one credential secret.
///
/// The secret service draws the value when the secret is created and keeps it across stack
/// updates; only replacing the secret (full stack recreation) draws a new one. No process
/// that runs this code ever sees the plaintext.
#[derive(Debug)]
pub struct SecretProvisioner<'a> {
    naming: Naming,
    config: &'a SecretsConfig,
}

impl<'a> SecretProvisioner<'a> {
    pub const fn new(naming: Naming, config: &'a SecretsConfig) -> Self {
        Self { naming, config }
    }

    /// Name of the secret entry, `{stack}-{environment}-api-key`.
    #[must_use]
    pub fn entry_name(&self) -> String {
        self.naming.physical("api-key")
    }

    /// Generation policy producing `{"apiKey": "<hex>"}` of the configured length.
    #[must_use]
    pub fn generation_policy(&self) -> Value {
        json!({
            "SecretStringTemplate": "{}",
            "GenerateStringKey": API_KEY_FIELD,
            "PasswordLength": self.config.key_length,
            "ExcludePunctuation": true,
            "ExcludeUppercase": true,
            "ExcludeCharacters": NON_HEX_LOWERCASE,
            "IncludeSpace": false,
            "RequireEachIncludedType": false,
        })
    }

    /// Declares the secret and returns the handle the compute and output layers read.
    ///
    /// # Errors
    /// * [`SecretError::Graph`] If the secret id is already declared.
    pub fn provision(&self, graph: &mut ResourceGraph) -> Result<CredentialHandle, SecretError> {
        let entry = self.entry_name();

        let secret = graph.add(
            LogicalId::new(SECRET_ID)?,
            Resource::new(ResourceKind::Secret)
                .property("Name", entry.as_str())
                .property("Description", format!("Search API key for {}", self.naming.prefix()))
                .property("GenerateSecretString", self.generation_policy()),
        )?;

        info!(entry = %entry, key_length = self.config.key_length, "Credential declared");
        Ok(CredentialHandle { secret, entry })
    }
}
