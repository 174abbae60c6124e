//! Anonymization configuration

use crate::anonymization::anonymizer::HashAlgorithm;
use crate::anonymization::generator::Locale;
use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Locales with faker support
pub const SUPPORTED_LOCALES: [&str; 7] = [
    "en_US", "fr_FR", "zh_CN", "zh_TW", "ja_JP", "ar_SA", "pt_BR",
];

/// Replacement strategy for one entity type
///
/// In TOML the variant is selected by the `strategy` key:
///
/// ```toml
/// [anonymization.strategies.CREDIT_CARD]
/// strategy = "mask"
/// chars_to_mask = 12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Stable synthetic substitute from the mapping store
    #[default]
    ConsistentReplace,
    /// Partial masking
    Mask {
        #[serde(default = "default_masking_char")]
        masking_char: char,
        #[serde(default)]
        chars_to_mask: Option<usize>,
        #[serde(default)]
        from_end: bool,
    },
    /// Hex digest of the value
    Hash {
        #[serde(default)]
        hash_type: HashAlgorithm,
        #[serde(default)]
        truncate: Option<usize>,
    },
    /// Fixed placeholder
    Redact {
        #[serde(default)]
        placeholder: Option<String>,
        #[serde(default)]
        include_type: bool,
    },
}

impl StrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConsistentReplace => "consistent_replace",
            Self::Mask { .. } => "mask",
            Self::Hash { .. } => "hash",
            Self::Redact { .. } => "redact",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Hash {
                truncate: Some(0), ..
            } => Err("hash truncate must be a positive integer".to_string()),
            Self::Mask { masking_char, .. } if masking_char.is_control() => {
                Err("masking_char must be a printable character".to_string())
            }
            _ => Ok(()),
        }
    }
}

fn default_masking_char() -> char {
    '*'
}

/// Anonymization pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Minimum score a span needs to be anonymized
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Language hint passed to an external recognizer
    #[serde(default = "default_language")]
    pub language: String,

    /// Locale for faker-backed generators (en_US, fr_FR, zh_CN, zh_TW)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Maximum accepted text length in bytes
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Maximum number of texts per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Spans resolved concurrently within one text
    #[serde(default = "default_span_concurrency")]
    pub span_concurrency: usize,

    /// Entity types detected when a request doesn't name any
    #[serde(default = "EntityType::default_enabled")]
    pub enabled_entity_types: Vec<EntityType>,

    /// Path to a pattern library TOML file replacing the built-in one
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Per-type strategy overrides; unlisted types use consistent replacement
    #[serde(default)]
    pub strategies: BTreeMap<EntityType, StrategyConfig>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_language() -> String {
    "en".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_max_text_length() -> usize {
    1_000_000
}

fn default_max_batch_size() -> usize {
    1000
}

fn default_span_concurrency() -> usize {
    8
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            language: default_language(),
            locale: default_locale(),
            max_text_length: default_max_text_length(),
            max_batch_size: default_max_batch_size(),
            span_concurrency: default_span_concurrency(),
            enabled_entity_types: EntityType::default_enabled(),
            pattern_library: None,
            strategies: BTreeMap::new(),
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            );
        }

        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            anyhow::bail!(
                "Invalid locale '{}'. Must be one of: {}",
                self.locale,
                SUPPORTED_LOCALES.join(", ")
            );
        }

        if self.max_text_length == 0 {
            anyhow::bail!("max_text_length must be > 0");
        }
        if self.max_batch_size == 0 {
            anyhow::bail!("max_batch_size must be > 0");
        }
        if self.span_concurrency == 0 || self.span_concurrency > 256 {
            anyhow::bail!(
                "span_concurrency must be between 1 and 256, got {}",
                self.span_concurrency
            );
        }

        if self.enabled_entity_types.is_empty() {
            anyhow::bail!("enabled_entity_types must not be empty");
        }

        for (entity_type, strategy) in &self.strategies {
            strategy
                .validate()
                .map_err(|e| anyhow::anyhow!("strategies.{entity_type}: {e}"))?;
        }

        // Validate pattern library path if specified
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Generator locale resolved from the configured tag
    pub fn generator_locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }

    /// Strategy for an entity type, defaulting to consistent replacement
    pub fn strategy_for(&self, entity_type: &EntityType) -> &StrategyConfig {
        static CONSISTENT: StrategyConfig = StrategyConfig::ConsistentReplace;
        self.strategies.get(entity_type).unwrap_or(&CONSISTENT)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MASQUERADE_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = val
                .parse()
                .context("Invalid MASQUERADE_CONFIDENCE_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("MASQUERADE_LANGUAGE") {
            self.language = val;
        }

        if let Ok(val) = std::env::var("MASQUERADE_LOCALE") {
            self.locale = val;
        }

        if let Ok(val) = std::env::var("MASQUERADE_MAX_TEXT_LENGTH") {
            self.max_text_length = val
                .parse()
                .context("Invalid MASQUERADE_MAX_TEXT_LENGTH value")?;
        }

        if let Ok(val) = std::env::var("MASQUERADE_MAX_BATCH_SIZE") {
            self.max_batch_size = val
                .parse()
                .context("Invalid MASQUERADE_MAX_BATCH_SIZE value")?;
        }

        if let Ok(val) = std::env::var("MASQUERADE_SPAN_CONCURRENCY") {
            self.span_concurrency = val
                .parse()
                .context("Invalid MASQUERADE_SPAN_CONCURRENCY value")?;
        }

        if let Ok(val) = std::env::var("MASQUERADE_ENABLED_ENTITY_TYPES") {
            self.enabled_entity_types = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(EntityType::from)
                .collect();
        }

        if let Ok(val) = std::env::var("MASQUERADE_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single line per event
    Text,
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    #[serde(default)]
    pub format: AuditFormat,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            format: AuditFormat::default(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path must not be empty when audit is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MASQUERADE_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid MASQUERADE_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("MASQUERADE_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("MASQUERADE_AUDIT_FORMAT") {
            self.format = match val.to_lowercase().as_str() {
                "json" => AuditFormat::Json,
                "text" => AuditFormat::Text,
                _ => anyhow::bail!("Invalid MASQUERADE_AUDIT_FORMAT: {}", val),
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnonymizationConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.locale, "en_US");
        assert_eq!(config.max_text_length, 1_000_000);
        assert_eq!(config.max_batch_size, 1000);
        assert!(config.audit.enabled);
        assert_eq!(config.audit.format, AuditFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = AnonymizationConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_locale_rejected() {
        let config = AnonymizationConfig {
            locale: "xx_YY".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategies_from_toml() {
        let config: AnonymizationConfig = toml::from_str(
            r#"
            confidence_threshold = 0.5

            [strategies.CREDIT_CARD]
            strategy = "mask"
            chars_to_mask = 12

            [strategies.EMAIL_ADDRESS]
            strategy = "hash"
            hash_type = "sha512"
            truncate = 16

            [strategies.US_SSN]
            strategy = "redact"
            include_type = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.strategy_for(&EntityType::CreditCard),
            &StrategyConfig::Mask {
                masking_char: '*',
                chars_to_mask: Some(12),
                from_end: false,
            }
        );
        assert_eq!(config.strategy_for(&EntityType::EmailAddress).name(), "hash");
        assert_eq!(config.strategy_for(&EntityType::UsSsn).name(), "redact");
        assert_eq!(
            config.strategy_for(&EntityType::Person),
            &StrategyConfig::ConsistentReplace
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_truncate_rejected() {
        let mut config = AnonymizationConfig::default();
        config.strategies.insert(
            EntityType::EmailAddress,
            StrategyConfig::Hash {
                hash_type: HashAlgorithm::Sha256,
                truncate: Some(0),
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("EMAIL_ADDRESS"));
    }
}
