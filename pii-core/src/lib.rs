//! # pii-core — Detecção de Dados Pessoais (PII) no Contexto Indiano
//!
//! Este crate encontra dados pessoais em texto livre, destaca os trechos
//! encontrados e decide se um envio pode prosseguir sem o consentimento do
//! usuário.
//!
//! ## Arquitetura do Sistema
//!
//! Um pipeline linear e raso:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Regex** ([`patterns`]): Telefones, Aadhaar, PAN, Voter ID, passaporte,
//!     GSTIN, IFSC, PIN, e-mail, URL e cartão de crédito.
//! 3.  **NER** ([`recognizer`]): Nomes, organizações e endereços via um
//!     reconhecedor externo tratado como caixa-preta, ou o [`heuristic`] local.
//! 4.  **Fusão** ([`merge`]): Deduplicação por limites exatos e ordenação.
//! 5.  **Destaque** ([`highlight`]): Texto segmentado e HTML com marcadores.
//! 6.  **Consentimento** ([`consent`]): Bloqueia o envio até a confirmação.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pii_core::{ConsentGate, PiiDetector};
//!
//! // 1. Tabela indiana + reconhecedor heurístico
//! let detector = PiiDetector::with_defaults().unwrap();
//!
//! // 2. Detecta
//! let text = "My email is a@b.com and PAN is ABCDE1234F";
//! let detection = detector.detect(text);
//!
//! for span in &detection.spans {
//!     println!("{} -> {} [{}..{})", span.label, span.value, span.start, span.end);
//! }
//!
//! // 3. Sem confirmação, o envio é bloqueado
//! assert!(ConsentGate::submit(&detection, false).is_err());
//! assert!(ConsentGate::submit(&detection, true).is_ok());
//! ```

pub mod consent;
pub mod error;
pub mod heuristic;
pub mod highlight;
pub mod merge;
pub mod patterns;
pub mod pipeline;
pub mod recognizer;
pub mod samples;
pub mod span;
pub mod tokenizer;

pub use consent::{ConsentGate, GateState, Submission, SubmissionBlocked};
pub use error::{PatternError, RecognizerError};
pub use heuristic::HeuristicRecognizer;
pub use highlight::{highlight, Highlight, Segment};
pub use merge::merge_spans;
pub use patterns::{PatternDef, PatternMatcher, PatternTable};
pub use pipeline::{Detection, DetectionEvent, PiiDetector};
pub use recognizer::{
    DeadlineRecognizer, EntityAdapter, EntityLabelMap, EntityRecognizer, RawEntity, Recognition,
    RecognizerStatus,
};
pub use span::Span;
