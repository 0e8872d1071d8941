use std::{collections::HashMap, env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::{error::ConfigError, service_account::ServiceAccountKey};

pub const DEFAULT_SPREADSHEET_ID: &str = "1KjopCS01TISleUm4ICrcYKtJw8Vl1FhDB2OJvAlMGz4";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AccessToken(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub spreadsheet_id: String,
    pub sheets_api_base: String,
    pub static_dir: String,
    pub sheets_timeout: Option<Duration>,
    pub credentials: Credentials,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_kv(&env::vars().collect())
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let sheets_timeout = var(kv, "SHEETS_TIMEOUT_MS")
            .map(|ms| parse::<u64>("SHEETS_TIMEOUT_MS", &ms))
            .transpose()?;
        if sheets_timeout == Some(0) {
            return Err(ConfigError::Invalid {
                key: "SHEETS_TIMEOUT_MS",
                message: "must be >= 1".to_string(),
            });
        }

        Ok(Self {
            port: try_load(kv, "PORT", "3000")?,
            spreadsheet_id: try_load(kv, "SPREADSHEET_ID", DEFAULT_SPREADSHEET_ID)?,
            sheets_api_base: try_load(kv, "SHEETS_API_BASE", DEFAULT_SHEETS_API_BASE)?,
            static_dir: try_load(kv, "STATIC_DIR", "public")?,
            sheets_timeout: sheets_timeout.map(Duration::from_millis),
            credentials: load_credentials(kv)?,
        })
    }
}

fn var(kv: &HashMap<String, String>, key: &str) -> Option<String> {
    kv.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError::Invalid {
            key,
            message: e.to_string(),
        }
    })
}

fn try_load<T: FromStr>(
    kv: &HashMap<String, String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(kv, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, &raw)
}

fn load_credentials(kv: &HashMap<String, String>) -> Result<Credentials, ConfigError> {
    if let Some(json) = var(kv, "GOOGLE_CREDENTIALS") {
        return Ok(Credentials::ServiceAccount(serde_json::from_str(&json)?));
    }

    if let Some(path) = var(kv, "GOOGLE_CREDENTIALS_FILE") {
        let json = read_to_string(&path)
            .map_err(|source| ConfigError::CredentialsFile { path, source })?;

        return Ok(Credentials::ServiceAccount(serde_json::from_str(&json)?));
    }

    if let Some(token) = var(kv, "SHEETS_ACCESS_TOKEN") {
        warn!("Using static SHEETS_ACCESS_TOKEN, service account auth disabled");
        return Ok(Credentials::AccessToken(token));
    }

    Err(ConfigError::MissingCredentials)
}
