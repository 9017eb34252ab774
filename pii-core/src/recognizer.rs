//! # Adaptador do Reconhecedor de Entidades (NER)
//!
//! O reconhecimento de nomes, organizações e endereços é delegado a uma
//! capacidade externa tratada como caixa-preta:
//!
//! ```text
//! recognize(text) -> [{category, start, end}, ...]
//! ```
//!
//! Este módulo traduz essa saída para [`Span`]s no mesmo formato do casador de
//! regex. O `value` é sempre recortado do texto original, nunca copiado da
//! resposta do modelo.
//!
//! ## Degradação
//!
//! Se o reconhecedor falhar, estourar o prazo ou devolver offsets fora do
//! texto, o adaptador devolve **zero** entidades e marca o resultado como
//! [`RecognizerStatus::Degraded`]. A detecção continua só com regex.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RecognizerError;
use crate::span::Span;

/// Entidade crua, como devolvida pelo reconhecedor (offsets em bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Código da categoria (ex: "PER", "ORG", "LOC", "MISC")
    pub category: String,
    pub start: usize,
    pub end: usize,
}

impl RawEntity {
    pub fn new(category: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            category: category.into(),
            start,
            end,
        }
    }
}

/// Resultado de uma chamada ao reconhecedor
pub type Recognition = Result<Vec<RawEntity>, RecognizerError>;

/// Capacidade de reconhecimento de entidades.
///
/// Implementações precisam ser `Send + Sync`: a mesma instância é
/// compartilhada entre requisições concorrentes.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Recognition;

    /// Identificador curto para logs e para a API
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<R: EntityRecognizer + ?Sized> EntityRecognizer for Arc<R> {
    fn recognize(&self, text: &str) -> Recognition {
        (**self).recognize(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Mapa de categorias do reconhecedor para rótulos de exibição.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabelMap {
    labels: HashMap<String, String>,
}

impl EntityLabelMap {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Rótulo de exibição; categorias desconhecidas passam como estão
    pub fn label_for<'a>(&'a self, category: &'a str) -> &'a str {
        self.labels
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }
}

impl Default for EntityLabelMap {
    fn default() -> Self {
        Self::new([
            ("PER", "Name"),
            ("ORG", "Organization"),
            ("LOC", "Address"),
            ("MISC", "Other"),
        ])
    }
}

/// Situação do reconhecedor em uma passada de detecção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecognizerStatus {
    /// Respondeu e a resposta foi aceita
    Ok { name: String },
    /// Nenhum reconhecedor configurado
    Disabled,
    /// Configurado, mas não chamado (texto em branco)
    Skipped { name: String },
    /// Falhou; suas entidades foram descartadas
    Degraded { name: String, reason: String },
}

impl RecognizerStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, RecognizerStatus::Degraded { .. })
    }
}

/// Converte respostas do reconhecedor em spans.
#[derive(Debug, Clone, Default)]
pub struct EntityAdapter {
    labels: EntityLabelMap,
}

impl EntityAdapter {
    pub fn new(labels: EntityLabelMap) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &EntityLabelMap {
        &self.labels
    }

    /// Chama o reconhecedor e adapta a resposta.
    pub fn recognize(&self, recognizer: &dyn EntityRecognizer, text: &str) -> (Vec<Span>, RecognizerStatus) {
        let result = recognizer.recognize(text);
        self.to_spans(text, recognizer.name(), result)
    }

    /// Adapta uma resposta já obtida.
    ///
    /// Uma única entidade mal formada invalida a resposta inteira: se os
    /// offsets de uma estão errados, os das outras não merecem confiança.
    pub fn to_spans(&self, text: &str, name: &str, result: Recognition) -> (Vec<Span>, RecognizerStatus) {
        let entities = match result {
            Ok(entities) => entities,
            Err(err) => return degraded(name, &err),
        };

        let mut spans = Vec::with_capacity(entities.len());
        for entity in &entities {
            let label = self.labels.label_for(&entity.category);
            match Span::from_text(text, label, entity.start, entity.end) {
                Some(span) => spans.push(span),
                None => {
                    let err = RecognizerError::Malformed(format!(
                        "{} [{}..{}) fora de um texto de {} bytes",
                        entity.category,
                        entity.start,
                        entity.end,
                        text.len()
                    ));
                    return degraded(name, &err);
                }
            }
        }

        (spans, RecognizerStatus::Ok { name: name.to_string() })
    }
}

fn degraded(name: &str, err: &RecognizerError) -> (Vec<Span>, RecognizerStatus) {
    warn!(recognizer = name, error = %err, "reconhecedor degradado, seguindo só com regex");
    (
        Vec::new(),
        RecognizerStatus::Degraded {
            name: name.to_string(),
            reason: err.to_string(),
        },
    )
}

/// Executa outro reconhecedor com prazo máximo.
///
/// As chamadas rodam num pool rayon próprio e limitado; se não responderem a
/// tempo, devolvem [`RecognizerError::Timeout`]. Uma chamada atrasada continua
/// ocupando um worker até terminar e seu resultado é descartado, então um
/// reconhecedor travado esgota o pool e as chamadas seguintes estouram o prazo
/// em vez de criar threads novas.
pub struct DeadlineRecognizer {
    inner: Arc<dyn EntityRecognizer>,
    deadline: Duration,
    pool: rayon::ThreadPool,
}

impl DeadlineRecognizer {
    /// Pool com o número padrão de workers do rayon (um por CPU).
    pub fn new(inner: Arc<dyn EntityRecognizer>, deadline: Duration) -> Result<Self, RecognizerError> {
        Self::with_workers(inner, deadline, 0)
    }

    /// `workers = 0` usa o padrão do rayon.
    pub fn with_workers(
        inner: Arc<dyn EntityRecognizer>,
        deadline: Duration,
        workers: usize,
    ) -> Result<Self, RecognizerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pii-ner-{}", i))
            // Sem handler, um panic num job do pool aborta o processo
            .panic_handler(|_| {})
            .build()
            .map_err(|e| RecognizerError::Unavailable(e.to_string()))?;
        Ok(Self {
            inner,
            deadline,
            pool,
        })
    }
}

impl EntityRecognizer for DeadlineRecognizer {
    fn recognize(&self, text: &str) -> Recognition {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        self.pool.spawn(move || {
            // O receptor pode já ter desistido: ignorar o erro de envio
            let _ = tx.send(inner.recognize(&text));
        });

        match rx.recv_timeout(self.deadline) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(RecognizerError::Timeout {
                millis: self.deadline.as_millis() as u64,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RecognizerError::Unavailable(
                "worker do reconhecedor terminou sem resposta".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Vec<RawEntity>);

    impl EntityRecognizer for Fixed {
        fn recognize(&self, _text: &str) -> Recognition {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct Failing;

    impl EntityRecognizer for Failing {
        fn recognize(&self, _text: &str) -> Recognition {
            Err(RecognizerError::Unavailable("modelo fora do ar".into()))
        }
    }

    struct Slow(Duration);

    impl EntityRecognizer for Slow {
        fn recognize(&self, _text: &str) -> Recognition {
            std::thread::sleep(self.0);
            Ok(vec![RawEntity::new("PER", 0, 4)])
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    struct Panicking;

    impl EntityRecognizer for Panicking {
        fn recognize(&self, _text: &str) -> Recognition {
            panic!("modelo quebrou");
        }
    }

    #[test]
    fn test_label_map_defaults_and_passthrough() {
        let map = EntityLabelMap::default();
        assert_eq!(map.label_for("PER"), "Name");
        assert_eq!(map.label_for("ORG"), "Organization");
        assert_eq!(map.label_for("LOC"), "Address");
        assert_eq!(map.label_for("MISC"), "Other");
        assert_eq!(map.label_for("DATE"), "DATE");
    }

    #[test]
    fn test_adapter_recomputes_value_from_text() {
        let text = "Ravi works at Infosys";
        let recognizer = Fixed(vec![RawEntity::new("PER", 0, 4), RawEntity::new("ORG", 14, 21)]);
        let (spans, status) = EntityAdapter::default().recognize(&recognizer, text);

        assert_eq!(status, RecognizerStatus::Ok { name: "fixed".into() });
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, "Name");
        assert_eq!(spans[0].value, "Ravi");
        assert_eq!(spans[1].label, "Organization");
        assert_eq!(spans[1].value, "Infosys");
    }

    #[test]
    fn test_adapter_degrades_on_error() {
        let (spans, status) = EntityAdapter::default().recognize(&Failing, "Ravi");
        assert!(spans.is_empty());
        assert!(status.is_degraded());
    }

    #[test]
    fn test_adapter_degrades_on_out_of_range_offsets() {
        let recognizer = Fixed(vec![RawEntity::new("PER", 0, 4), RawEntity::new("LOC", 5, 50)]);
        let (spans, status) = EntityAdapter::default().recognize(&recognizer, "Ravi Pune");
        assert!(spans.is_empty());
        match status {
            RecognizerStatus::Degraded { name, reason } => {
                assert_eq!(name, "fixed");
                assert!(reason.contains("mal formada"));
            }
            other => panic!("esperava degradado, veio {:?}", other),
        }
    }

    #[test]
    fn test_adapter_degrades_on_inverted_or_split_char_offsets() {
        let inverted = Fixed(vec![RawEntity::new("PER", 3, 1)]);
        let (spans, status) = EntityAdapter::default().recognize(&inverted, "Ravi");
        assert!(spans.is_empty() && status.is_degraded());

        let split = Fixed(vec![RawEntity::new("PER", 0, 1)]);
        let (spans, status) = EntityAdapter::default().recognize(&split, "Śiva");
        assert!(spans.is_empty() && status.is_degraded());
    }

    #[test]
    fn test_deadline_passes_fast_results_through() {
        let inner: Arc<dyn EntityRecognizer> = Arc::new(Slow(Duration::from_millis(0)));
        let recognizer = DeadlineRecognizer::new(inner, Duration::from_secs(5)).unwrap();
        assert_eq!(recognizer.recognize("Ravi").unwrap().len(), 1);
        assert_eq!(recognizer.name(), "slow");
    }

    #[test]
    fn test_deadline_times_out() {
        let inner: Arc<dyn EntityRecognizer> = Arc::new(Slow(Duration::from_millis(500)));
        let recognizer = DeadlineRecognizer::new(inner, Duration::from_millis(20)).unwrap();
        assert_eq!(
            recognizer.recognize("Ravi"),
            Err(RecognizerError::Timeout { millis: 20 })
        );

        let (spans, status) = EntityAdapter::default().recognize(&recognizer, "Ravi");
        assert!(spans.is_empty());
        assert!(status.is_degraded());
    }

    #[test]
    fn test_deadline_survives_panicking_recognizer() {
        let inner: Arc<dyn EntityRecognizer> = Arc::new(Panicking);
        let recognizer = DeadlineRecognizer::new(inner, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            recognizer.recognize("Ravi"),
            Err(RecognizerError::Unavailable(_))
        ));
    }

    struct Counting {
        active: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    impl EntityRecognizer for Counting {
        fn recognize(&self, _text: &str) -> Recognition {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_timed_out_calls_share_bounded_workers() {
        let counting = Arc::new(Counting {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay: Duration::from_millis(100),
        });
        let inner: Arc<dyn EntityRecognizer> = counting.clone();
        let recognizer = DeadlineRecognizer::with_workers(inner, Duration::from_millis(10), 1).unwrap();

        for _ in 0..4 {
            assert!(matches!(
                recognizer.recognize("Ravi"),
                Err(RecognizerError::Timeout { .. })
            ));
        }
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(counting.peak.load(Ordering::SeqCst), 1);
    }
}
