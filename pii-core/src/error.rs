//! # Erros do detector
//!
//! Dois tipos de falha com tratamentos opostos:
//!
//! - [`PatternError`]: tabela de padrões inválida. É fatal na inicialização,
//!   o servidor não sobe com uma tabela quebrada.
//! - [`RecognizerError`]: o reconhecedor de entidades falhou. É recuperável,
//!   a detecção segue apenas com os spans de regex.

use std::path::PathBuf;

use thiserror::Error;

/// Erro de configuração da tabela de padrões.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("tabela de padrões vazia")]
    EmptyTable,

    #[error("padrão #{index} sem rótulo")]
    MissingLabel { index: usize },

    #[error("padrão '{label}' sem expressão regular")]
    MissingRegex { label: String },

    #[error("rótulo duplicado na tabela de padrões: '{label}'")]
    DuplicateLabel { label: String },

    #[error("expressão regular inválida para '{label}': {source}")]
    InvalidRegex {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("não foi possível ler {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("arquivo de padrões mal formado: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Falha do reconhecedor de entidades (modelo externo ou local).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    #[error("reconhecedor indisponível: {0}")]
    Unavailable(String),

    #[error("reconhecedor excedeu o prazo de {millis} ms")]
    Timeout { millis: u64 },

    #[error("entidade mal formada: {0}")]
    Malformed(String),

    #[error("erro HTTP: {0}")]
    Http(String),

    #[error("resposta ilegível: {0}")]
    Decode(String),
}
