use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Clinica";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outbound SMTP session timeout.
pub const MAIL_TIMEOUT_SECS: u64 = 30;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinica_lib=info,clinica=info,tower_http=info"
}

/// Get the application data directory
/// ~/Clinica/ on all platforms, falling back to ./Clinica without a home.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Process-wide settings, loaded once at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub clinic: ClinicInfo,
    pub mail: MailConfig,
    /// Split document text the historical way (first of newline, period,
    /// comma, semicolon) instead of one bullet per line.
    pub legacy_bullets: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: app_data_dir(),
            bind_addr: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
            clinic: ClinicInfo::default(),
            mail: MailConfig::default(),
            legacy_bullets: false,
        }
    }
}

impl AppConfig {
    /// Read `path` if given; otherwise all defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("clinica.db")
    }

    /// Rendered chart images, served under `/static`.
    pub fn static_dir(&self) -> PathBuf {
        self.data_dir.join("static")
    }

    /// Reports generated for e-mail are kept here.
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }
}

/// Letterhead printed on prescriptions and diagnosis reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicInfo {
    pub name: String,
    pub specialty: String,
    pub address_lines: Vec<String>,
    pub phone_line: String,
}

impl Default for ClinicInfo {
    fn default() -> Self {
        Self {
            name: "CLÍNICA MÉDICA INTEGRAL".into(),
            specialty: "Especialistas en Medicina General".into(),
            address_lines: vec![
                "Av. Independencia No. 123, Centro Histórico".into(),
                "Ciudad de Veracruz, Veracruz, México".into(),
            ],
            phone_line: "Tel: (229) 123-4567 | Cel: (229) 987-6543".into(),
        }
    }
}

/// How the SMTP connection is secured. Replaces the old `use_tls` /
/// `use_ssl` flag pair, where `use_ssl` took precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailSecurity {
    /// Plain SMTP. Only sensible against a local relay.
    None,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// TLS from the first byte (SMTPS).
    ImplicitTls,
}

/// Mail relay descriptor handed to the notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub security: MailSecurity,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 465,
            sender_email: String::new(),
            sender_password: String::new(),
            security: MailSecurity::ImplicitTls,
        }
    }
}

impl MailConfig {
    /// Sender address and password are both required to send anything.
    pub fn is_configured(&self) -> bool {
        !self.smtp_server.trim().is_empty()
            && !self.sender_email.trim().is_empty()
            && !self.sender_password.is_empty()
    }
}
