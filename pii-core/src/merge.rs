//! # Fusão de Spans
//!
//! Junta os spans do casador de regex e do reconhecedor de entidades em um
//! conjunto único:
//!
//! 1. **Deduplicação por limites exatos**: dois spans com o mesmo
//!    `(start, end)` viram um só, mesmo com rótulos diferentes. O que aparece
//!    **por último** na entrada fica com o conteúdo; a posição relativa é a da
//!    primeira ocorrência (semântica de mapa com ordem de inserção).
//! 2. **Ordenação estável por `start`**: empates mantêm a ordem relativa.
//!
//! Como os spans de NER vêm depois dos de regex na entrada, um rótulo do NER
//! prevalece sobre um de regex com os mesmos limites.
//!
//! Spans com limites diferentes que se cruzam continuam ambos aqui; quem lida
//! com eles é o [`crate::highlight`].

use std::collections::HashMap;

use crate::span::Span;

/// Deduplica por `(start, end)` e ordena por `start`.
pub fn merge_spans<I>(spans: I) -> Vec<Span>
where
    I: IntoIterator<Item = Span>,
{
    let mut slots: HashMap<(usize, usize), usize> = HashMap::new();
    let mut unique: Vec<Span> = Vec::new();

    for span in spans {
        match slots.get(&span.bounds()) {
            Some(&slot) => unique[slot] = span,
            None => {
                slots.insert(span.bounds(), unique.len());
                unique.push(span);
            }
        }
    }

    unique.sort_by_key(|s| s.start);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(label: &str, start: usize, end: usize) -> Span {
        Span {
            label: label.to_string(),
            value: "x".repeat(end - start),
            start,
            end,
        }
    }

    #[test]
    fn test_identical_bounds_collapse_last_wins() {
        let merged = merge_spans(vec![span("Name", 10, 20), span("Organization", 10, 20)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].label, "Organization");
        assert_eq!((merged[0].start, merged[0].end), (10, 20));
    }

    #[test]
    fn test_sorted_by_start() {
        let merged = merge_spans(vec![span("B", 30, 35), span("A", 0, 4), span("C", 12, 18)]);
        let starts: Vec<usize> = merged.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 12, 30]);
    }

    #[test]
    fn test_equal_starts_keep_first_insertion_order() {
        // (5,9) entra primeiro, (5,12) depois; o (5,9) repetido no fim
        // troca o conteúdo mas não a posição
        let merged = merge_spans(vec![
            span("Short", 5, 9),
            span("Long", 5, 12),
            span("ShortAgain", 5, 9),
        ]);
        let labels: Vec<&str> = merged.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["ShortAgain", "Long"]);
    }

    #[test]
    fn test_idempotent() {
        let once = merge_spans(vec![
            span("A", 20, 25),
            span("B", 3, 7),
            span("C", 3, 7),
            span("D", 3, 9),
        ]);
        let twice = merge_spans(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_partial_overlaps_survive() {
        let merged = merge_spans(vec![span("A", 0, 10), span("B", 5, 15)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(merge_spans(Vec::new()).is_empty());
    }
}
