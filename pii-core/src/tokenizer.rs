//! # Tokenizador por fronteira de palavra Unicode
//!
//! Divide o texto em palavras preservando a posição original (offset em bytes)
//! de cada uma, para que o reconhecedor heurístico possa devolver entidades
//! apontando direto para o texto. Usa as regras de fronteira de palavra do
//! UAX #29, o que cobre tanto inglês quanto escritas índicas (devanágari etc.).
//!
//! Espaços são descartados; pontuação vira token próprio.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Sharma", ",", "560001").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Primeira letra maiúscula (ex: "Priya", "ICICI")
    pub fn is_capitalized(&self) -> bool {
        self.text
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
    }

    pub fn is_word(&self) -> bool {
        self.text.chars().any(|c| c.is_alphanumeric())
    }

    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

/// Tokeniza o texto em palavras e pontuação.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bound_indices()
        .filter(|(_, piece)| !piece.trim().is_empty())
        .enumerate()
        .map(|(index, (start, piece))| Token {
            text: piece.to_string(),
            start,
            end: start + piece.len(),
            index,
        })
        .collect()
}
