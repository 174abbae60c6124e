//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{MasqueradeConfig, PostgreSQLConfig, StoreBackend};
use super::secret::secret_string;
use crate::domain::errors::MasqueradeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`MasqueradeConfig`]
/// 4. Applies environment variable overrides (`MASQUERADE_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`MasqueradeError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML does not parse, an
/// override has an invalid value, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use masquerade::config::load_config;
///
/// let config = load_config("masquerade.toml").expect("Failed to load config");
/// println!("store backend: {}", config.store.backend.as_str());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MasqueradeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MasqueradeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MasqueradeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] for configuration text already in memory
pub fn load_config_from_str(contents: &str) -> Result<MasqueradeConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: MasqueradeConfig = toml::from_str(&contents)
        .map_err(|e| MasqueradeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MasqueradeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MasqueradeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MasqueradeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `MASQUERADE_*` prefix
///
/// `DATABASE_URL` is honoured as a fallback for the PostgreSQL connection
/// string so the usual twelve-factor variable works unchanged.
fn apply_env_overrides(config: &mut MasqueradeConfig) -> Result<()> {
    if let Ok(val) = std::env::var("MASQUERADE_LOG_LEVEL") {
        config.application.log_level = val.to_lowercase();
    }
    if let Ok(val) = std::env::var("MASQUERADE_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => super::schema::Environment::Development,
            "staging" => super::schema::Environment::Staging,
            "production" => super::schema::Environment::Production,
            other => {
                return Err(MasqueradeError::Configuration(format!(
                    "Invalid MASQUERADE_ENVIRONMENT: {other}"
                )))
            }
        };
    }

    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| MasqueradeError::Configuration(format!("{e:#}")))?;

    // Store overrides
    if let Ok(val) = std::env::var("MASQUERADE_STORE_BACKEND") {
        config.store.backend = val
            .parse::<StoreBackend>()
            .map_err(MasqueradeError::Configuration)?;
    }

    let connection_string = std::env::var("MASQUERADE_POSTGRESQL_CONNECTION_STRING")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok();
    if let Some(val) = connection_string {
        match config.store.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => {
                config.store.postgresql = Some(PostgreSQLConfig {
                    connection_string: secret_string(val),
                    ..postgresql_defaults()?
                })
            }
        }
    }

    if let Some(ref mut pg) = config.store.postgresql {
        if let Ok(val) = std::env::var("MASQUERADE_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = val.parse().map_err(|_| {
                MasqueradeError::Configuration(format!(
                    "Invalid MASQUERADE_POSTGRESQL_MAX_CONNECTIONS: {val}"
                ))
            })?;
        }
        if let Ok(val) = std::env::var("MASQUERADE_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MASQUERADE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("MASQUERADE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

/// PostgreSQL section with every optional field at its default
fn postgresql_defaults() -> Result<PostgreSQLConfig> {
    toml::from_str("connection_string = \"\"").map_err(|e| {
        MasqueradeError::Configuration(format!("Failed to build PostgreSQL defaults: {e}"))
    })
}
