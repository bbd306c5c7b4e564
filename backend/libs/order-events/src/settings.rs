//! Kafka connection settings, loaded from `KAFKA_*` environment variables
use rdkafka::ClientConfig;
use serde::Deserialize;
use std::fmt;

/// Where a consumer group with no committed offset starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetReset {
    #[default]
    Earliest,
    Latest,
}

impl OffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityProtocol {
    #[default]
    Plaintext,
    Ssl,
    SaslPlaintext,
    SaslSsl,
}

impl SecurityProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityProtocol::Plaintext => "plaintext",
            SecurityProtocol::Ssl => "ssl",
            SecurityProtocol::SaslPlaintext => "sasl_plaintext",
            SecurityProtocol::SaslSsl => "sasl_ssl",
        }
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broker connection settings shared by the producer and the consumer
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaSettings {
    /// Comma separated broker list
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: String,

    /// Consumer group; only read by the consumer
    #[serde(default = "default_group_id")]
    pub group_id: String,

    #[serde(default)]
    pub auto_offset_reset: OffsetReset,

    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u32,

    #[serde(default)]
    pub security_protocol: SecurityProtocol,

    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_bootstrap_servers() -> String {
    "localhost:9092".to_string()
}

fn default_group_id() -> String {
    "poc-consumer-group".to_string()
}

fn default_session_timeout_ms() -> u32 {
    6000
}

fn default_topic() -> String {
    crate::topics::ORDERS.to_string()
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            bootstrap_servers: default_bootstrap_servers(),
            group_id: default_group_id(),
            auto_offset_reset: OffsetReset::default(),
            session_timeout_ms: default_session_timeout_ms(),
            security_protocol: SecurityProtocol::default(),
            topic: default_topic(),
        }
    }
}

impl KafkaSettings {
    /// Load from `KAFKA_BOOTSTRAP_SERVERS`, `KAFKA_GROUP_ID`, ... and validate
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings: Self = envy::prefixed("KAFKA_").from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bootstrap_servers.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "bootstrap_servers must not be empty".to_string(),
            ));
        }
        if self.group_id.trim().is_empty() {
            return Err(SettingsError::Invalid("group_id must not be empty".to_string()));
        }
        if self.topic.trim().is_empty() {
            return Err(SettingsError::Invalid("topic must not be empty".to_string()));
        }
        if self.session_timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "session_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Client config with the connection keys every client needs
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("security.protocol", self.security_protocol.as_str());
        config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid Kafka settings: {0}")]
    Invalid(String),
}
