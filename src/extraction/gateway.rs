//! Vision model gateway
//!
//! One stateless call per ingestion attempt: the document plus a fixed
//! instruction prompt go to the external multimodal model, the model's
//! free-form text comes back. No retries, no rate limiting; the call runs
//! to completion or failure and there is no cancellation path once sent.

use crate::capture::DocumentPayload;
use crate::config::ExtractionConfig;
use crate::core::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instruction prompt sent with every document. The model is asked for one
/// JSON object and nothing else, but callers must still tolerate prose
/// around it (see [`crate::extraction::normalize`]).
pub const EXTRACTION_PROMPT: &str = r#"Analise este cupom fiscal e extraia as seguintes informações em formato JSON:
{
  "loja_nome": "nome da loja",
  "valor_total": 0.00,
  "produtos": [
    {
      "nome": "nome do produto",
      "preco": 0.00,
      "preco_unitario": 0.00,
      "quantidade": 1,
      "unidade": "un",
      "palavras_chave": ["palavra1", "palavra2"]
    }
  ]
}

Instruções:
- Extraia apenas produtos reais com preços válidos
- Use valores numéricos para preços e quantidades (não strings)
- "preco" é o total da linha; "preco_unitario" é o preço por unidade quando visível
- "quantidade" pode ser fracionária para produtos vendidos por peso
- "unidade" é uma de: un, kg, g, l, ml
- "palavras_chave" são duas palavras de busca para o produto
- Se não conseguir identificar produtos individuais, coloque apenas o valor total
- Seja preciso com os nomes dos produtos
- Responda APENAS com o JSON, sem texto adicional"#;

/// Errors produced by the extraction pipeline (gateway + normalizer)
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The extraction credential is absent; a deployment problem, not a
    /// caller error
    #[error("extraction API key is not configured")]
    MissingCredential,

    /// The request to the gateway could not be completed
    #[error("vision gateway request failed: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status
    #[error("vision gateway returned status {status}")]
    Gateway { status: u16, body: String },

    /// The gateway answered 2xx but without any text content
    #[error("vision gateway response carried no text content")]
    EmptyResponse,

    /// The model's text contained no JSON object at all
    #[error("no JSON object found in the model output")]
    NoJsonObject,

    /// A JSON object was found but did not decode as a receipt
    #[error("failed to decode extracted JSON: {0}")]
    InvalidJson(String),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MissingCredential => AppError::configuration(err.to_string()),
            other => AppError::extraction(other.to_string()),
        }
    }
}

/// Boundary to the external vision model
#[async_trait]
pub trait VisionGateway: Send + Sync {
    /// Send one document and return the model's raw text reply
    async fn extract(&self, doc: &DocumentPayload) -> Result<String, ExtractionError>;
}

// =============================================================================
// Gemini wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

// =============================================================================
// Gemini gateway
// =============================================================================

/// [`VisionGateway`] implementation backed by the Gemini generateContent API
pub struct GeminiGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    /// Checked per request, so a key added to the environment is picked up
    /// by a restart without any other configuration change
    api_key: Option<String>,
}

impl GeminiGateway {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn request_body(doc: &DocumentPayload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(EXTRACTION_PROMPT.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: doc.kind.mime_type().to_string(),
                            data: doc.base64.clone(),
                        }),
                    },
                ],
            }],
        }
    }

    fn first_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl VisionGateway for GeminiGateway {
    async fn extract(&self, doc: &DocumentPayload) -> Result<String, ExtractionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ExtractionError::MissingCredential)?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, api_key
        );

        tracing::debug!(model = %self.model, kind = ?doc.kind, bytes = doc.decoded_len, "sending document to vision gateway");

        let response = self
            .client
            .post(&url)
            .json(&Self::request_body(doc))
            .send()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "vision gateway error: {}", body);
            return Err(ExtractionError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        Self::first_text(parsed).ok_or(ExtractionError::EmptyResponse)
    }
}
