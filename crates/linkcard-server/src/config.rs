//! Server configuration read from the environment.
//!
//! Every setting is read once at startup into [`ServerConfig`]. Secrets
//! (store credential, admin password) only ever come from the environment.
//!
//! - `LINKCARD_PORT`: listen port (default `3000`)
//! - `LINKCARD_STORE`: `memory`, `sqlite` or `remote` (default `sqlite`)
//! - `LINKCARD_DB_PATH`: SQLite file (default `linkcard.db`)
//! - `SUPABASE_URL` / `SUPABASE_ANON_KEY`: remote store endpoint and key
//!   (`VITE_`-prefixed names are accepted too)
//! - `LINKCARD_TABLE`: remote table name (default `profile_data`)
//! - `ADMIN_PASSWORD`: editor password (`VITE_ADMIN_PASSWORD` also accepted)
//! - `LINKCARD_SAVE_POLICY`: `immediate` or `explicit` (default `immediate`)
//! - `LINKCARD_COMPRESS_LINKS`: store links codec-encoded (default `false`)

use std::str::FromStr;

use linkcard_storage::rest::DEFAULT_TABLE;
use linkcard_storage::LinkEncoding;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {key}")]
    Missing { key: &'static str },

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the singleton record lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite { path: String },
    Remote {
        url: String,
        api_key: String,
        table: String,
    },
}

/// When editor changes are written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavePolicy {
    /// Every edit is followed by a full save.
    #[default]
    Immediate,
    /// Only an explicit save request writes.
    Explicit,
}

impl FromStr for SavePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(SavePolicy::Immediate),
            "explicit" => Ok(SavePolicy::Explicit),
            other => Err(format!("expected immediate or explicit, got {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub backend: StoreBackend,
    pub admin_password: String,
    pub save_policy: SavePolicy,
    pub link_encoding: LinkEncoding,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(*key))
                .filter(|v| !v.trim().is_empty())
        };

        let port = match get(&["LINKCARD_PORT"]) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "LINKCARD_PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => 3000,
        };

        let backend = match get(&["LINKCARD_STORE"]).as_deref().map(str::trim) {
            None | Some("sqlite") => StoreBackend::Sqlite {
                path: get(&["LINKCARD_DB_PATH"]).unwrap_or_else(|| "linkcard.db".to_string()),
            },
            Some("memory") => StoreBackend::Memory,
            Some("remote") => StoreBackend::Remote {
                url: get(&["SUPABASE_URL", "VITE_SUPABASE_URL"])
                    .ok_or(ConfigError::Missing { key: "SUPABASE_URL" })?,
                api_key: get(&["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]).ok_or(
                    ConfigError::Missing {
                        key: "SUPABASE_ANON_KEY",
                    },
                )?,
                table: get(&["LINKCARD_TABLE"]).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LINKCARD_STORE",
                    value: other.to_string(),
                    reason: "expected memory, sqlite or remote".to_string(),
                })
            }
        };

        let admin_password = get(&["ADMIN_PASSWORD", "VITE_ADMIN_PASSWORD"]).unwrap_or_default();
        if admin_password.is_empty() {
            tracing::warn!("ADMIN_PASSWORD not set, the editor will reject every login");
        }

        let save_policy = match get(&["LINKCARD_SAVE_POLICY"]) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "LINKCARD_SAVE_POLICY",
                value: raw.clone(),
                reason,
            })?,
            None => SavePolicy::default(),
        };

        let link_encoding = match get(&["LINKCARD_COMPRESS_LINKS"]) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => LinkEncoding::Compressed,
                "0" | "false" | "no" | "off" => LinkEncoding::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "LINKCARD_COMPRESS_LINKS",
                        value: raw,
                        reason: "expected a boolean".to_string(),
                    })
                }
            },
            None => LinkEncoding::Json,
        };

        Ok(ServerConfig {
            port,
            backend,
            admin_password,
            save_policy,
            link_encoding,
        })
    }
}
