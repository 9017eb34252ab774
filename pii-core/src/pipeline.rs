//! # Pipeline de Detecção — Orquestrador com Eventos Observáveis
//!
//! Coordena os estágios de uma passada de detecção e emite um evento ao fim
//! de cada um via canal Rust (`mpsc`), permitindo que o servidor WebSocket
//! transmita o progresso para o navegador:
//!
//! ```text
//! texto ─► regex ─► PatternsMatched
//!       └► NER   ─► EntitiesRecognized
//!                      └► fusão ─► SpansMerged ─► destaque ─► Done
//! ```
//!
//! As tabelas (padrões e rótulos) são imutáveis depois de construídas, então
//! um mesmo [`PiiDetector`] atende chamadas concorrentes sem trava.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatternError;
use crate::heuristic::HeuristicRecognizer;
use crate::highlight::{highlight, Highlight};
use crate::merge::merge_spans;
use crate::patterns::{PatternMatcher, PatternTable};
use crate::recognizer::{EntityAdapter, EntityLabelMap, EntityRecognizer, Recognition, RecognizerStatus};
use crate::span::Span;

/// Resultado de uma passada de detecção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Spans únicos, ordenados por `start`
    pub spans: Vec<Span>,
    /// Casamentos de regex antes da fusão
    pub pattern_hits: usize,
    /// Entidades aceitas do reconhecedor antes da fusão
    pub entity_hits: usize,
    pub recognizer: RecognizerStatus,
    pub processing_ms: u64,
}

impl Detection {
    pub fn has_pii(&self) -> bool {
        !self.spans.is_empty()
    }

    /// Segmenta o texto que originou esta detecção
    pub fn highlight(&self, text: &str) -> Highlight {
        highlight(text, &self.spans)
    }
}

/// Eventos emitidos durante a detecção.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DetectionEvent {
    /// **Passo 1**: todos os padrões aplicados
    PatternsMatched { spans: Vec<Span> },
    /// **Passo 2**: reconhecedor respondeu (ou degradou)
    EntitiesRecognized {
        spans: Vec<Span>,
        status: RecognizerStatus,
    },
    /// **Passo 3**: spans deduplicados e ordenados
    SpansMerged { spans: Vec<Span> },
    /// **Conclusão**: detecção final e texto destacado
    Done {
        detection: Detection,
        html: String,
        /// Spans deixados de fora do destaque por sobreposição
        skipped: Vec<Span>,
    },
}

/// O detector de PII.
///
/// # Exemplo
///
/// ```rust
/// use pii_core::PiiDetector;
///
/// let detector = PiiDetector::with_defaults().unwrap();
/// let detection = detector.detect("Call me at 9876543210");
/// assert!(detection.has_pii());
/// ```
pub struct PiiDetector {
    matcher: PatternMatcher,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    adapter: EntityAdapter,
}

impl PiiDetector {
    /// Detector só com regex, sem reconhecedor de entidades
    pub fn new(table: PatternTable) -> Self {
        Self {
            matcher: PatternMatcher::new(table),
            recognizer: None,
            adapter: EntityAdapter::default(),
        }
    }

    /// Tabela indiana + reconhecedor heurístico local
    pub fn with_defaults() -> Result<Self, PatternError> {
        Ok(Self::new(PatternTable::india()?).with_recognizer(Arc::new(HeuristicRecognizer::new())))
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_labels(mut self, labels: EntityLabelMap) -> Self {
        self.adapter = EntityAdapter::new(labels);
        self
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn recognizer_name(&self) -> Option<&'static str> {
        self.recognizer.as_ref().map(|r| r.name())
    }

    /// Detecção síncrona usando o reconhecedor configurado.
    pub fn detect(&self, text: &str) -> Detection {
        self.collect(text, None)
    }

    /// Detecção com uma resposta de reconhecedor obtida por fora
    /// (ex: modelo hospedado chamado de forma assíncrona pelo servidor).
    pub fn detect_with(&self, text: &str, name: &str, recognition: Recognition) -> Detection {
        self.collect(text, Some((name, recognition)))
    }

    /// Processa vários textos em paralelo.
    pub fn detect_batch(&self, texts: &[&str]) -> Vec<Detection> {
        texts.par_iter().map(|text| self.detect(text)).collect()
    }

    fn collect(&self, text: &str, external: Option<(&str, Recognition)>) -> Detection {
        let (tx, rx) = mpsc::channel();
        self.detect_streaming(text, external, tx);

        let mut detection = None;
        while let Ok(event) = rx.recv() {
            if let DetectionEvent::Done { detection: d, .. } = event {
                detection = Some(d);
            }
        }
        detection.unwrap_or_else(|| self.empty_detection(0))
    }

    /// Executa a detecção enviando eventos de progresso.
    ///
    /// Com `external = Some(..)` a resposta dada é usada no lugar do
    /// reconhecedor configurado. O último evento é sempre `Done`.
    pub fn detect_streaming(
        &self,
        text: &str,
        external: Option<(&str, Recognition)>,
        tx: mpsc::Sender<DetectionEvent>,
    ) {
        let start = Instant::now();

        if text.trim().is_empty() {
            let _ = tx.send(DetectionEvent::Done {
                detection: self.empty_detection(start.elapsed().as_millis() as u64),
                html: crate::highlight::html_escape(text),
                skipped: Vec::new(),
            });
            return;
        }

        // === Passo 1: Regex ===
        let pattern_spans = self.matcher.scan(text);
        let _ = tx.send(DetectionEvent::PatternsMatched {
            spans: pattern_spans.clone(),
        });

        // === Passo 2: NER ===
        let (entity_spans, status) = match external {
            Some((name, recognition)) => self.adapter.to_spans(text, name, recognition),
            None => match &self.recognizer {
                Some(recognizer) => self.adapter.recognize(recognizer.as_ref(), text),
                None => (Vec::new(), RecognizerStatus::Disabled),
            },
        };
        let _ = tx.send(DetectionEvent::EntitiesRecognized {
            spans: entity_spans.clone(),
            status: status.clone(),
        });

        // === Passo 3: Fusão (regex primeiro, NER depois: NER vence empates) ===
        let pattern_hits = pattern_spans.len();
        let entity_hits = entity_spans.len();
        let spans = merge_spans(pattern_spans.into_iter().chain(entity_spans));
        let _ = tx.send(DetectionEvent::SpansMerged {
            spans: spans.clone(),
        });

        // === Passo 4: Destaque ===
        let highlighted = highlight(text, &spans);
        let detection = Detection {
            spans,
            pattern_hits,
            entity_hits,
            recognizer: status,
            processing_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            bytes = text.len(),
            pattern_hits,
            entity_hits,
            unique = detection.spans.len(),
            skipped = highlighted.skipped.len(),
            "detecção concluída"
        );

        let _ = tx.send(DetectionEvent::Done {
            html: highlighted.to_html(),
            skipped: highlighted.skipped,
            detection,
        });
    }

    fn empty_detection(&self, processing_ms: u64) -> Detection {
        let recognizer = match self.recognizer_name() {
            Some(name) => RecognizerStatus::Skipped { name: name.to_string() },
            None => RecognizerStatus::Disabled,
        };
        Detection {
            spans: Vec::new(),
            pattern_hits: 0,
            entity_hits: 0,
            recognizer,
            processing_ms,
        }
    }
}
