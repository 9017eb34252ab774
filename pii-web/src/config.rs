//! Configuração do servidor via variáveis de ambiente.
//!
//! | Variável             | Padrão         | Uso                                       |
//! |----------------------|----------------|-------------------------------------------|
//! | `PII_BIND_ADDR`      | `0.0.0.0:3000` | endereço de escuta                        |
//! | `PII_PATTERNS_FILE`  | —              | TOML que substitui a tabela indiana       |
//! | `PII_NER_URL`        | —              | endpoint do modelo NER hospedado          |
//! | `PII_NER_TOKEN`      | —              | token Bearer do endpoint                  |
//! | `PII_NER_TIMEOUT_MS` | `5000`         | prazo de qualquer reconhecedor            |
//! | `PII_LOCAL_NER`      | `true`         | usa o reconhecedor heurístico sem modelo  |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
#[error("valor inválido para {var}: '{value}' ({reason})")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Modelo NER hospedado
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub patterns_file: Option<PathBuf>,
    pub remote: Option<RemoteConfig>,
    pub local_ner: bool,
    pub ner_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Constrói a configuração a partir de uma função de consulta, o que
    /// permite testar sem mexer no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("PII_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e: std::net::AddrParseError| ConfigError {
            var: "PII_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let ner_timeout = match get("PII_NER_TIMEOUT_MS") {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError {
                    var: "PII_NER_TIMEOUT_MS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if millis == 0 {
                    return Err(ConfigError {
                        var: "PII_NER_TIMEOUT_MS",
                        value: raw,
                        reason: "deve ser maior que zero".to_string(),
                    });
                }
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        let local_ner = match get("PII_LOCAL_NER") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError {
                var: "PII_LOCAL_NER",
                value: raw.clone(),
                reason: "use true/false, on/off ou 1/0".to_string(),
            })?,
            None => true,
        };

        let remote = get("PII_NER_URL").map(|url| RemoteConfig {
            url,
            token: get("PII_NER_TOKEN"),
            timeout: ner_timeout,
        });

        Ok(Self {
            bind_addr,
            patterns_file: get("PII_PATTERNS_FILE").map(PathBuf::from),
            remote,
            local_ner,
            ner_timeout,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
