//! # Portão de Consentimento
//!
//! Dois estados, nada além disso:
//!
//! - **Blocked**: há PII detectada e o usuário não confirmou ciência.
//! - **Allowed**: não há PII, ou há e o usuário confirmou explicitamente.
//!
//! Não existe consentimento parcial, automático ou com expiração. O portão é
//! avaliado a cada tentativa de envio com a detecção **daquela** tentativa;
//! nenhum resultado é reaproveitado entre tentativas.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::Detection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Blocked,
    Allowed,
}

/// Envio aceito
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Submission {
    /// Nenhuma PII encontrada
    Clean,
    /// PII encontrada e consentida
    Consented,
}

impl Submission {
    pub fn message(&self) -> &'static str {
        match self {
            Submission::Clean => "No PII detected -- submission complete!",
            Submission::Consented => "Submission complete! (PII detected, user consented)",
        }
    }

    pub fn consented(&self) -> bool {
        matches!(self, Submission::Consented)
    }
}

/// Envio recusado por falta de confirmação
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Submission blocked. Please acknowledge and consent to proceed.")]
pub struct SubmissionBlocked {
    /// Quantidade de spans que exigiram a confirmação
    pub detected: usize,
}

pub struct ConsentGate;

impl ConsentGate {
    pub fn evaluate(detection: &Detection, acknowledged: bool) -> GateState {
        if !detection.has_pii() || acknowledged {
            GateState::Allowed
        } else {
            GateState::Blocked
        }
    }

    pub fn submit(detection: &Detection, acknowledged: bool) -> Result<Submission, SubmissionBlocked> {
        match Self::evaluate(detection, acknowledged) {
            GateState::Blocked => Err(SubmissionBlocked {
                detected: detection.spans.len(),
            }),
            GateState::Allowed if detection.has_pii() => Ok(Submission::Consented),
            GateState::Allowed => Ok(Submission::Clean),
        }
    }
}
