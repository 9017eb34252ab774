//! Cliente do modelo NER hospedado.
//!
//! Fala o formato de classificação de tokens da API de inferência do
//! Hugging Face, com agregação já aplicada no servidor:
//!
//! ```text
//! POST {url}   {"inputs": "Ravi lives in Pune"}
//! 200          [{"entity_group": "PER", "score": 0.99, "word": "Ravi", "start": 0, "end": 4}, ...]
//! ```
//!
//! Os offsets da resposta contam **caracteres**; aqui viram bytes antes de
//! chegar ao adaptador. Qualquer falha (rede, status, JSON, offsets) vira um
//! [`RecognizerError`] e a detecção segue só com regex.

use pii_core::span::char_to_byte_offset;
use pii_core::{RawEntity, Recognition, RecognizerError};
use serde::Deserialize;

use crate::config::RemoteConfig;

pub const REMOTE_NAME: &str = "remote";

/// Entidade como devolvida pelo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HostedEntity {
    /// Presente quando a agregação está ligada
    #[serde(default)]
    pub entity_group: Option<String>,
    /// Presente sem agregação (ex: "B-PER")
    #[serde(default)]
    pub entity: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl HostedEntity {
    fn category(&self) -> Option<String> {
        if let Some(group) = &self.entity_group {
            return Some(group.clone());
        }
        self.entity.as_ref().map(|tag| {
            tag.strip_prefix("B-")
                .or_else(|| tag.strip_prefix("I-"))
                .unwrap_or(tag)
                .to_string()
        })
    }
}

#[derive(Clone)]
pub struct RemoteRecognizer {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout_ms: u64,
}

impl RemoteRecognizer {
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
            timeout_ms: config.timeout.as_millis() as u64,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn recognize(&self, text: &str) -> Recognition {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RecognizerError::Timeout {
                    millis: self.timeout_ms,
                }
            } else {
                RecognizerError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognizerError::Http(format!("status {}", status)));
        }

        let entities: Vec<HostedEntity> = response
            .json()
            .await
            .map_err(|e| RecognizerError::Decode(e.to_string()))?;
        to_raw_entities(text, &entities)
    }
}

/// Converte a resposta do endpoint em entidades com offsets em bytes.
pub fn to_raw_entities(text: &str, entities: &[HostedEntity]) -> Recognition {
    entities
        .iter()
        .map(|e| {
            let category = e.category().ok_or_else(|| {
                RecognizerError::Malformed(format!("entidade [{}..{}) sem categoria", e.start, e.end))
            })?;
            let start = char_to_byte_offset(text, e.start);
            let end = char_to_byte_offset(text, e.end);
            match (start, end) {
                (Some(start), Some(end)) => Ok(RawEntity::new(category, start, end)),
                _ => Err(RecognizerError::Malformed(format!(
                    "{} [{}..{}) além de {} caracteres",
                    category,
                    e.start,
                    e.end,
                    text.chars().count()
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(json: &str) -> Vec<HostedEntity> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_char_offsets_become_byte_offsets() {
        let text = "Śrī Rāma lives in Pune";
        let entities = parse(
            r#"[{"entity_group":"PER","score":0.98,"word":"Rāma","start":4,"end":8},
                {"entity_group":"LOC","score":0.95,"word":"Pune","start":18,"end":22}]"#,
        );
        let raw = to_raw_entities(text, &entities).unwrap();
        assert_eq!(&text[raw[0].start..raw[0].end], "Rāma");
        assert_eq!(raw[0].category, "PER");
        assert_eq!(&text[raw[1].start..raw[1].end], "Pune");
    }

    #[test]
    fn test_unaggregated_tags_are_stripped() {
        let entities = parse(r#"[{"entity":"B-ORG","score":0.9,"word":"Wipro","start":0,"end":5}]"#);
        let raw = to_raw_entities("Wipro", &entities).unwrap();
        assert_eq!(raw, vec![RawEntity::new("ORG", 0, 5)]);
    }

    #[test]
    fn test_out_of_range_is_malformed() {
        let entities = parse(r#"[{"entity_group":"PER","start":0,"end":40}]"#);
        assert!(matches!(
            to_raw_entities("short", &entities),
            Err(RecognizerError::Malformed(_))
        ));

        let entities = parse(r#"[{"start":0,"end":2}]"#);
        assert!(matches!(
            to_raw_entities("short", &entities),
            Err(RecognizerError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let recognizer = RemoteRecognizer::new(&RemoteConfig {
            url: "http://127.0.0.1:9/ner".to_string(),
            token: None,
            timeout: Duration::from_millis(500),
        })
        .unwrap();
        assert!(recognizer.recognize("Ravi").await.is_err());
    }
}
