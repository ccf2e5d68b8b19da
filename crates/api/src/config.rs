use std::path::PathBuf;

use candidates_store::backend::BackendKind;
use candidates_store::sheets::{ServiceAccount, SheetsConfig};

use crate::auth::jwt::JwtConfig;
use crate::auth::password::hash_password;

/// Password accepted when no `ADMIN_PASSWORD_HASH` is configured.
const DEV_PASSWORD: &str = "ALFAROUQ";

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// The single operator credential guarding the record endpoints.
    pub gate: GateConfig,
    /// Which backend holds the records and where.
    pub storage: StorageConfig,
}

/// Operator credential. The password is only ever held as a PHC hash.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub kind: BackendKind,
    /// JSON document used by the file backend.
    pub data_file: PathBuf,
    /// Present whenever `SHEET_ID` is set. Also enables `/sheet/append`
    /// when it carries a service account, whatever the backend kind.
    pub sheets: Option<SheetsConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                |
    /// |--------------------------|----------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                              |
    /// | `PORT`                   | `3000`                                 |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                   |
    /// | `ADMIN_USERNAME`         | `admin`                                |
    /// | `ADMIN_PASSWORD_HASH`    | hash of the development password       |
    /// | `STORAGE_BACKEND`        | `file` (`file`, `sheets`, `memory`)    |
    /// | `DATA_FILE`              | `data/candidates.json`                 |
    /// | `SHEET_ID`               | --                                     |
    /// | `SHEET_NAME`             | `Candidates`                           |
    /// | `SHEETS_API_BASE`        | `https://sheets.googleapis.com`        |
    /// | `SHEETS_API_KEY`         | --                                     |
    /// | `GOOGLE_CLIENT_EMAIL`    | --                                     |
    /// | `GOOGLE_PRIVATE_KEY`     | --                                     |
    /// | `GOOGLE_TOKEN_URI`       | `https://oauth2.googleapis.com/token`  |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed numeric values, an unknown `STORAGE_BACKEND`, or
    /// `STORAGE_BACKEND=sheets` without `SHEET_ID`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            gate: GateConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Self {
        let username = env_non_empty("ADMIN_USERNAME").unwrap_or_else(|| "admin".into());

        let password_hash = match env_non_empty("ADMIN_PASSWORD_HASH") {
            Some(hash) => hash,
            None => {
                tracing::warn!(
                    username = %username,
                    "ADMIN_PASSWORD_HASH not set, using the development password",
                );
                hash_password(DEV_PASSWORD).expect("Failed to hash the development password")
            }
        };

        Self {
            username,
            password_hash,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let kind = match env_non_empty("STORAGE_BACKEND") {
            Some(name) => BackendKind::from_name(&name)
                .unwrap_or_else(|| panic!("STORAGE_BACKEND must be file, sheets or memory, got '{name}'")),
            None => BackendKind::File,
        };

        let data_file = env_non_empty("DATA_FILE")
            .unwrap_or_else(|| "data/candidates.json".into())
            .into();

        let sheets = env_non_empty("SHEET_ID").map(|spreadsheet_id| {
            let service_account = match (
                env_non_empty("GOOGLE_CLIENT_EMAIL"),
                env_non_empty("GOOGLE_PRIVATE_KEY"),
            ) {
                (Some(email), Some(key)) => Some(ServiceAccount::new(
                    email,
                    &key,
                    env_non_empty("GOOGLE_TOKEN_URI")
                        .unwrap_or_else(|| "https://oauth2.googleapis.com/token".into()),
                )),
                _ => None,
            };

            SheetsConfig {
                api_base: env_non_empty("SHEETS_API_BASE")
                    .unwrap_or_else(|| "https://sheets.googleapis.com".into()),
                spreadsheet_id,
                sheet_name: env_non_empty("SHEET_NAME").unwrap_or_else(|| "Candidates".into()),
                api_key: env_non_empty("SHEETS_API_KEY"),
                service_account,
            }
        });

        if kind == BackendKind::Sheets && sheets.is_none() {
            panic!("STORAGE_BACKEND=sheets requires SHEET_ID");
        }

        Self {
            kind,
            data_file,
            sheets,
        }
    }
}

/// Read an env var, treating empty or whitespace-only values as unset.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
