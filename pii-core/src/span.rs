//! # Spans rotulados
//!
//! Um [`Span`] é um trecho do texto original marcado com um rótulo de PII.
//! Tanto o casador de regex quanto o adaptador de NER produzem spans neste
//! mesmo formato, o que permite fundi-los e destacá-los sem distinção de origem.
//!
//! Os offsets são **posições de byte** no texto UTF-8 e sempre caem em
//! fronteiras de caractere, então `&text[start..end]` nunca entra em pânico.

use serde::{Deserialize, Serialize};

/// Trecho rotulado do texto.
///
/// # Exemplo
/// Em "Call me at 9876543210":
/// `Span { label: "Indian Phone Number", value: "9876543210", start: 11, end: 21 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Rótulo exibido (ex: "PAN Number", "Name")
    pub label: String,
    /// Texto coberto, sempre igual a `text[start..end]`
    pub value: String,
    /// Byte inicial (inclusivo)
    pub start: usize,
    /// Byte final (exclusivo)
    pub end: usize,
}

impl Span {
    /// Cria um span recortando `value` do próprio texto.
    ///
    /// Retorna `None` se os limites não forem válidos para `text`.
    pub fn from_text(text: &str, label: impl Into<String>, start: usize, end: usize) -> Option<Self> {
        let value = text.get(start..end)?;
        Some(Self {
            label: label.into(),
            value: value.to_string(),
            start,
            end,
        })
    }

    /// Chave de deduplicação: limites exatos
    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Verifica o invariante `value == text[start..end]`
    pub fn is_consistent_with(&self, text: &str) -> bool {
        text.get(self.start..self.end) == Some(self.value.as_str())
    }

    /// Dois spans se sobrepõem se compartilham ao menos um byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Converte um offset em caracteres (como os devolvidos por modelos em Python)
/// para offset em bytes.
///
/// `char_offset == número de caracteres` é aceito e vira `text.len()`.
/// Retorna `None` se o offset passar do fim do texto.
pub fn char_to_byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    let mut count = 0;
    for (byte_pos, _) in text.char_indices() {
        if count == char_offset {
            return Some(byte_pos);
        }
        count += 1;
    }
    if count == char_offset {
        Some(text.len())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_slices_value() {
        let text = "Call me at 9876543210";
        let span = Span::from_text(text, "Indian Phone Number", 11, 21).unwrap();
        assert_eq!(span.value, "9876543210");
        assert!(span.is_consistent_with(text));
    }

    #[test]
    fn test_from_text_rejects_bad_bounds() {
        assert!(Span::from_text("abc", "X", 2, 5).is_none());
        assert!(Span::from_text("abc", "X", 2, 1).is_none());
        // "é" ocupa 2 bytes: 1 não é fronteira de caractere
        assert!(Span::from_text("é", "X", 0, 1).is_none());
    }

    #[test]
    fn test_overlaps() {
        let a = Span::from_text("abcdefgh", "A", 0, 4).unwrap();
        let b = Span::from_text("abcdefgh", "B", 3, 6).unwrap();
        let c = Span::from_text("abcdefgh", "C", 4, 6).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_char_to_byte_offset() {
        let text = "Śrī Rāma lives";
        assert_eq!(char_to_byte_offset(text, 0), Some(0));
        assert_eq!(char_to_byte_offset(text, 4), Some("Śrī ".len()));
        assert_eq!(char_to_byte_offset(text, text.chars().count()), Some(text.len()));
        assert_eq!(char_to_byte_offset(text, text.chars().count() + 1), None);
    }
}
