//! Application settings loaded via OrthoConfig, and the HTTP server
//! configuration built from them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use achievement_ledger::domain::{
    DocumentSettings, OfficeCode, OfficeCodeError, SchoolProfile, VerificationUrlBuilder,
    VerificationUrlError,
};
use achievement_ledger::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_ROOT: &str = "var/storage";
const DEFAULT_STORAGE_PUBLIC_URL: &str = "http://localhost:8080/files";
const DEFAULT_RENDER_QUEUE_CAPACITY: usize = 64;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_SCHOOL_NAME: &str = "Nama Sekolah";
const DEFAULT_SCHOOL_ADDRESS: &str = "Alamat Sekolah";
const DEFAULT_HEADMASTER_NAME: &str = "Kepala Sekolah";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error(transparent)]
    OfficeCode(#[from] OfficeCodeError),
    #[error(transparent)]
    AppUrl(#[from] VerificationUrlError),
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
}

/// Settings for the achievement ledger server.
///
/// Every field can be supplied through `ACHIEVEMENT_LEDGER_*` environment
/// variables, a configuration file or command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACHIEVEMENT_LEDGER")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_idle: Option<u32>,
    /// Public base URL used to build verification links.
    pub app_url: Option<String>,
    /// Office code embedded in certificate numbers.
    pub office_code: Option<String>,
    pub school_name: Option<String>,
    pub school_address: Option<String>,
    pub headmaster_name: Option<String>,
    pub headmaster_nip: Option<String>,
    /// Directory rendered certificates are written to.
    pub storage_root: Option<PathBuf>,
    /// Base URL the storage directory is served from.
    pub storage_public_url: Option<String>,
    /// Pending render jobs held before new submissions are rejected.
    pub render_queue_capacity: Option<usize>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    pub cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Fall back to a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session: bool,
    /// Apply pending migrations before serving traffic.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr {
            Some(addr) => Ok(addr),
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| SettingsError::Invalid {
                    name: "bind_addr",
                    value: DEFAULT_BIND_ADDR.to_owned(),
                    expected: "host:port",
                }),
        }
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                name: "database_url",
            })
    }

    /// Pool settings derived from the database options.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS))
            .with_min_idle(self.db_min_idle)
            .with_connection_timeout(Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS)))
    }

    pub fn office_code(&self) -> Result<OfficeCode, SettingsError> {
        match &self.office_code {
            Some(code) => Ok(OfficeCode::new(code.clone())?),
            None => Ok(OfficeCode::default()),
        }
    }

    /// School identity and verification link settings for rendered documents.
    pub fn document_settings(&self) -> Result<DocumentSettings, SettingsError> {
        let app_url = self.app_url.as_deref().unwrap_or(DEFAULT_APP_URL);
        Ok(DocumentSettings {
            school: SchoolProfile {
                name: or_default(&self.school_name, DEFAULT_SCHOOL_NAME),
                address: or_default(&self.school_address, DEFAULT_SCHOOL_ADDRESS),
                headmaster_name: or_default(&self.headmaster_name, DEFAULT_HEADMASTER_NAME),
                headmaster_nip: self
                    .headmaster_nip
                    .as_deref()
                    .map(str::trim)
                    .filter(|nip| !nip.is_empty())
                    .map(str::to_owned),
            },
            verification_urls: VerificationUrlBuilder::new(app_url)?,
        })
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }

    pub fn storage_public_url(&self) -> &str {
        self.storage_public_url
            .as_deref()
            .unwrap_or(DEFAULT_STORAGE_PUBLIC_URL)
    }

    pub fn render_queue_capacity(&self) -> usize {
        self.render_queue_capacity
            .unwrap_or(DEFAULT_RENDER_QUEUE_CAPACITY)
            .max(1)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Parse the configured `SameSite` policy, defaulting to `Lax`.
    ///
    /// # Errors
    ///
    /// Rejects unknown policies and `None` without secure cookies.
    pub fn same_site(&self) -> Result<SameSite, SettingsError> {
        let Some(value) = self.same_site.as_deref() else {
            return Ok(SameSite::Lax);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if self.cookie_secure() => Ok(SameSite::None),
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ => Err(SettingsError::Invalid {
                name: "same_site",
                value: value.to_owned(),
                expected: SAMESITE_EXPECTED,
            }),
        }
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_owned()
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: &[&str] = &[
        "ACHIEVEMENT_LEDGER_BIND_ADDR",
        "ACHIEVEMENT_LEDGER_DATABASE_URL",
        "ACHIEVEMENT_LEDGER_APP_URL",
        "ACHIEVEMENT_LEDGER_OFFICE_CODE",
        "ACHIEVEMENT_LEDGER_SCHOOL_NAME",
        "ACHIEVEMENT_LEDGER_HEADMASTER_NIP",
        "ACHIEVEMENT_LEDGER_RENDER_QUEUE_CAPACITY",
        "ACHIEVEMENT_LEDGER_SAME_SITE",
        "ACHIEVEMENT_LEDGER_COOKIE_SECURE",
        "ACHIEVEMENT_LEDGER_ALLOW_EPHEMERAL_SESSION",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("achievement-ledger")])
            .expect("config should load")
    }

    fn env_vars(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env(env_vars(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(settings.office_code().expect("office").to_string(), "421.2");
        assert_eq!(settings.render_queue_capacity(), DEFAULT_RENDER_QUEUE_CAPACITY);
        assert_eq!(settings.same_site().expect("same site"), SameSite::Lax);
        assert!(settings.cookie_secure());
        assert!(!settings.allow_ephemeral_session);
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing {
                name: "database_url"
            })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_vars(&[
            ("ACHIEVEMENT_LEDGER_BIND_ADDR", "127.0.0.1:9090"),
            (
                "ACHIEVEMENT_LEDGER_DATABASE_URL",
                "postgres://ledger@localhost/ledger",
            ),
            ("ACHIEVEMENT_LEDGER_APP_URL", "https://prestasi.example.sch.id/"),
            ("ACHIEVEMENT_LEDGER_OFFICE_CODE", "800.1"),
            ("ACHIEVEMENT_LEDGER_SCHOOL_NAME", "SMA Negeri 1 Contoh"),
            ("ACHIEVEMENT_LEDGER_HEADMASTER_NIP", "  "),
            ("ACHIEVEMENT_LEDGER_RENDER_QUEUE_CAPACITY", "8"),
            ("ACHIEVEMENT_LEDGER_SAME_SITE", "strict"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("addr").to_string(),
            "127.0.0.1:9090"
        );
        assert_eq!(
            settings.database_url().expect("database url"),
            "postgres://ledger@localhost/ledger"
        );
        assert_eq!(settings.office_code().expect("office").to_string(), "800.1");
        assert_eq!(settings.render_queue_capacity(), 8);
        assert_eq!(settings.same_site().expect("same site"), SameSite::Strict);

        let documents = settings.document_settings().expect("document settings");
        assert_eq!(documents.school.name, "SMA Negeri 1 Contoh");
        assert_eq!(documents.school.address, DEFAULT_SCHOOL_ADDRESS);
        assert!(documents.school.headmaster_nip.is_none());
    }

    #[rstest]
    #[case("ACHIEVEMENT_LEDGER_SAME_SITE", "sideways")]
    #[case("ACHIEVEMENT_LEDGER_APP_URL", "ftp://prestasi.example.sch.id")]
    fn invalid_values_are_reported(#[case] name: &'static str, #[case] value: &'static str) {
        let _guard = lock_env(env_vars(&[(name, value)]));

        let settings = load_from_empty_args();

        assert!(settings.same_site().is_err() || settings.document_settings().is_err());
    }

    #[rstest]
    fn same_site_none_requires_secure_cookies() {
        let _guard = lock_env(env_vars(&[("ACHIEVEMENT_LEDGER_SAME_SITE", "None")]));
        let mut settings = load_from_empty_args();
        settings.cookie_secure = Some(false);

        assert!(matches!(
            settings.same_site(),
            Err(SettingsError::InsecureSameSiteNone)
        ));
    }
}
