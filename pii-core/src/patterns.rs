//! # Casador de Padrões — Regex para PII indiana
//!
//! Uma tabela ordenada de pares (rótulo, regex) é aplicada ao texto bruto.
//! Cada padrão roda de forma independente com a semântica padrão de busca
//! (mais à esquerda, sem sobreposição). O mesmo trecho pode sair repetido sob
//! rótulos diferentes: quem resolve isso é o [`crate::merge`].
//!
//! Não há validação além do casamento (nada de dígito verificador do Aadhaar
//! ou do cartão). Falsos positivos são esperados.
//!
//! ## Tabela padrão
//!
//! | Rótulo              | Exemplo                 |
//! |---------------------|-------------------------|
//! | Indian Phone Number | +91 9876543210          |
//! | Aadhaar Number      | 1234 5678 9012          |
//! | PAN Number          | ABCDE1234F              |
//! | Voter ID            | ABC1234567              |
//! | Passport Number     | J8369854                |
//! | GSTIN               | 27ABCDE1234F1Z5         |
//! | Indian Bank IFSC    | SBIN0001234             |
//! | Indian PIN Code     | PIN 560001              |
//! | Email               | a@b.com                 |
//! | URL                 | https://example.in      |
//! | Credit Card         | 4111 1111 1111 1111     |
//!
//! ## Arquivo de padrões
//!
//! A tabela pode ser substituída por um arquivo TOML:
//!
//! ```toml
//! [[pattern]]
//! label = "PAN Number"
//! regex = '\b[A-Z]{5}[0-9]{4}[A-Z]{1}\b'
//! ```

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::span::Span;

/// Definição textual de um padrão, antes da compilação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDef {
    pub label: String,
    pub regex: String,
}

impl PatternDef {
    pub fn new(label: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            regex: regex.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(default)]
    pattern: Vec<PatternDef>,
}

/// Padrões do contexto indiano, na ordem em que são aplicados.
pub const INDIA_PATTERNS: &[(&str, &str)] = &[
    ("Indian Phone Number", r"\b(?:\+91[\-\s]?|0)?[6-9]\d{9}\b"),
    ("Aadhaar Number", r"\b\d{4}\s\d{4}\s\d{4}\b|\b\d{12}\b"),
    ("PAN Number", r"\b[A-Z]{5}[0-9]{4}[A-Z]{1}\b"),
    ("Voter ID", r"\b([A-Z]{3}[0-9]{7})\b"),
    ("Passport Number", r"\b([A-Z]{1}-?\d{7}|[A-Z]{2}\d{7})\b"),
    ("GSTIN", r"\b\d{2}[A-Z]{5}\d{4}[A-Z]{1}[A-Z\d]{1}[Z]{1}[A-Z\d]{1}\b"),
    ("Indian Bank IFSC", r"\b[A-Z]{4}0[A-Z0-9]{6}\b"),
    (
        "Indian PIN Code",
        r"(?i)\b(?:PIN|Pin|Post|Postal|Postal Code|PIN Code)[:\- ]?\s*[1-9][0-9]{5}\b",
    ),
    ("Email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
    ("URL", r"http[s]?://[^\s]+|www\.[^\s]+"),
    ("Credit Card", r"\b(?:\d[ -]*?){13,16}\b"),
];

/// Um padrão compilado
#[derive(Debug, Clone)]
pub struct Pattern {
    pub label: String,
    pub regex: Regex,
}

/// Tabela de padrões compilada. Imutável depois de construída.
#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: Vec<Pattern>,
}

impl PatternTable {
    /// Compila uma lista de definições.
    ///
    /// Qualquer definição inválida derruba a tabela inteira: não existe
    /// tabela "parcialmente válida".
    pub fn new<I>(defs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = PatternDef>,
    {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (index, def) in defs.into_iter().enumerate() {
            let label = def.label.trim().to_string();
            if label.is_empty() {
                return Err(PatternError::MissingLabel { index });
            }
            if def.regex.trim().is_empty() {
                return Err(PatternError::MissingRegex { label });
            }
            if !seen.insert(label.clone()) {
                return Err(PatternError::DuplicateLabel { label });
            }
            let regex = Regex::new(&def.regex).map_err(|source| PatternError::InvalidRegex {
                label: label.clone(),
                source,
            })?;
            entries.push(Pattern { label, regex });
        }

        if entries.is_empty() {
            return Err(PatternError::EmptyTable);
        }
        Ok(Self { entries })
    }

    /// Tabela padrão de PII indiana
    pub fn india() -> Result<Self, PatternError> {
        Self::new(
            INDIA_PATTERNS
                .iter()
                .map(|(label, regex)| PatternDef::new(*label, *regex)),
        )
    }

    pub fn from_toml_str(source: &str) -> Result<Self, PatternError> {
        let file: PatternFile = toml::from_str(source)?;
        Self::new(file.pattern)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn entries(&self) -> &[Pattern] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definições de volta em texto (para inspeção via API)
    pub fn definitions(&self) -> Vec<PatternDef> {
        self.entries
            .iter()
            .map(|p| PatternDef::new(p.label.clone(), p.regex.as_str()))
            .collect()
    }
}

/// Aplica a tabela de padrões a um texto.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    table: PatternTable,
}

impl PatternMatcher {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Retorna todos os casamentos de todos os padrões.
    ///
    /// Ordem de saída: pela ordem da tabela e, dentro de cada padrão, pela
    /// posição no texto. A fusão depende dessa ordem para o desempate.
    pub fn scan(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for pattern in &self.table.entries {
            for m in pattern.regex.find_iter(text) {
                spans.push(Span {
                    label: pattern.label.clone(),
                    value: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        spans
    }
}
