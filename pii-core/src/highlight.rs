//! # Destaque Inline
//!
//! Reconstrói o texto original intercalando trechos comuns e trechos
//! marcados como PII. O resultado é uma **partição** do texto: concatenar os
//! segmentos devolve exatamente a entrada.
//!
//! ## Spans sobrepostos
//!
//! Depois da fusão ainda podem sobrar spans que se cruzam sem ter os mesmos
//! limites (ex: um Aadhaar e um cartão de crédito sobre os mesmos dígitos).
//! A política aqui é determinística: percorrendo por `start`, um span que
//! começa antes do fim do último span emitido é **pulado** e devolvido em
//! [`Highlight::skipped`]. O primeiro a começar vence; em empate de `start`,
//! vence o que veio primeiro na lista.
//!
//! ## HTML
//!
//! [`Highlight::to_html`] envolve cada trecho marcado em
//! `<span class="pii" title="Rótulo" data-label="Rótulo">…</span>`, com
//! escape de HTML no texto e no rótulo.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::span::Span;

/// Estilo do marcador (fundo rosado, texto vermelho)
const MARK_STYLE: &str = "background-color:#ffdddd;color:#d00000;";

/// Um pedaço do texto: comum (`label == None`) ou marcado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub label: Option<String>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            label: None,
        }
    }

    pub fn is_marked(&self) -> bool {
        self.label.is_some()
    }
}

/// Texto segmentado e os spans que ficaram de fora por sobreposição.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Highlight {
    pub segments: Vec<Segment>,
    pub skipped: Vec<Span>,
}

impl Highlight {
    /// Concatenação dos segmentos, igual ao texto original
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn marked(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_marked())
    }

    /// Renderiza como HTML para exibição em uma superfície rica
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match &segment.label {
                Some(label) => {
                    let label = html_escape(label);
                    html.push_str(&format!(
                        "<span class=\"pii\" style=\"{}\" title=\"{}\" data-label=\"{}\">{}</span>",
                        MARK_STYLE,
                        label,
                        label,
                        html_escape(&segment.text)
                    ));
                }
                None => html.push_str(&html_escape(&segment.text)),
            }
        }
        html
    }
}

/// Segmenta `text` segundo `spans`.
///
/// Os spans são ordenados de forma estável por `start` antes do percurso;
/// spans com limites inválidos para o texto também vão para `skipped`.
pub fn highlight(text: &str, spans: &[Span]) -> Highlight {
    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut result = Highlight::default();
    let mut cursor = 0;

    for span in ordered {
        if span.start < cursor || text.get(span.start..span.end).is_none() {
            debug!(label = %span.label, start = span.start, end = span.end, cursor, "span pulado");
            result.skipped.push(span.clone());
            continue;
        }
        if span.start > cursor {
            result.segments.push(Segment::plain(&text[cursor..span.start]));
        }
        result.segments.push(Segment {
            text: text[span.start..span.end].to_string(),
            label: Some(span.label.clone()),
        });
        cursor = span.end;
    }

    if cursor < text.len() {
        result.segments.push(Segment::plain(&text[cursor..]));
    }
    result
}

/// Escapa caracteres especiais de HTML.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn span(text: &str, label: &str, start: usize, end: usize) -> Span {
        Span::from_text(text, label, start, end).unwrap()
    }

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_gap_marked_gap() {
        let text = "Call me at 9876543210 today";
        let h = highlight(text, &[span(text, "Indian Phone Number", 11, 21)]);
        assert_eq!(h.segments.len(), 3);
        assert_eq!(h.segments[0], Segment::plain("Call me at "));
        assert_eq!(h.segments[1].label.as_deref(), Some("Indian Phone Number"));
        assert_eq!(h.segments[1].text, "9876543210");
        assert_eq!(h.segments[2], Segment::plain(" today"));
        assert!(h.skipped.is_empty());
    }

    #[test]
    fn test_adjacent_and_edge_spans() {
        let text = "ABCDE1234Fa@b.com";
        let h = highlight(
            text,
            &[span(text, "Email", 10, 17), span(text, "PAN Number", 0, 10)],
        );
        let labels: Vec<Option<&str>> = h.segments.iter().map(|s| s.label.as_deref()).collect();
        assert_eq!(labels, vec![Some("PAN Number"), Some("Email")]);
        assert_eq!(h.plain_text(), text);
    }

    #[test]
    fn test_overlapping_span_is_skipped() {
        let text = "card 4111 1111 1111 1111 ok";
        let aadhaar = span(text, "Aadhaar Number", 5, 19);
        let card = span(text, "Credit Card", 5, 24);
        let inner = span(text, "Other", 10, 14);
        let h = highlight(text, &[aadhaar.clone(), card.clone(), inner.clone()]);

        assert_eq!(h.marked().count(), 1);
        assert_eq!(h.marked().next().unwrap().label.as_deref(), Some("Aadhaar Number"));
        assert_eq!(h.skipped, vec![card, inner]);
        assert_eq!(h.plain_text(), text);
    }

    #[test]
    fn test_invalid_span_is_skipped() {
        let text = "short";
        let bogus = Span {
            label: "X".into(),
            value: String::new(),
            start: 2,
            end: 40,
        };
        let h = highlight(text, &[bogus]);
        assert_eq!(h.skipped.len(), 1);
        assert_eq!(h.plain_text(), text);
    }

    #[test]
    fn test_no_spans_and_empty_text() {
        let h = highlight("nothing here", &[]);
        assert_eq!(h.segments, vec![Segment::plain("nothing here")]);
        assert!(highlight("", &[]).segments.is_empty());
    }

    #[test]
    fn test_html_escapes_and_round_trips() {
        let text = "<b>Ravi</b> & \"Sita\" at x@y.in";
        let spans = vec![
            span(text, "Name", 3, 7),
            span(text, "Name", 15, 19),
            span(text, "Email", 24, 30),
        ];
        let html = highlight(text, &spans).to_html();

        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains("title=\"Email\""));
        assert!(!html.contains("<b>"));

        let markers = Regex::new(r#"<span class="pii"[^>]*>|</span>"#).unwrap();
        let stripped = markers.replace_all(&html, "");
        assert_eq!(unescape(&stripped), text);
    }

    #[test]
    fn test_label_is_escaped() {
        let text = "abc";
        let html = highlight(text, &[span(text, "a\"b", 0, 3)]).to_html();
        assert!(html.contains("title=\"a&quot;b\""));
    }
}
