use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::EncodedImage;

const DIAGNOSIS_PROMPT: &str = "Look at this plant photo and describe any visible damage, \
disease, pest infestation, or nutrient deficiency. Keep it short and concrete.";

fn remedy_prompt(diagnosis: &str) -> String {
  format!(
    "A plant shows the following condition: {diagnosis}. Suggest suitable fertilizers, \
pesticides if pests are involved, and prevention tips. Answer as a short bulleted list, \
one suggestion per line."
  )
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RemoteError {
  #[error("{0}")]
  RequestFailed(String),
  #[error("The model returned no usable answer.")]
  EmptyResponse,
}

#[derive(Serialize)]
struct GenerateRequest {
  contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  parts: Vec<Part>,
}

// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
  Text {
    text: String,
  },
  InlineData {
    #[serde(rename = "inlineData")]
    inline_data: InlineData,
  },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
  mime_type: String,
  data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Content,
}

pub struct GeminiClient {
  http: reqwest::Client,
  api_base: String,
  api_key: String,
  vision_model: String,
  text_model: String,
}

impl GeminiClient {
  pub fn new(config: &AppConfig, api_key: String) -> anyhow::Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .build()?;
    Ok(Self {
      http,
      api_base: config.api_base.trim_end_matches('/').to_string(),
      api_key,
      vision_model: config.vision_model.clone(),
      text_model: config.text_model.clone(),
    })
  }

  pub async fn diagnose(&self, image: &EncodedImage) -> Result<String, RemoteError> {
    let parts = vec![
      Part::Text {
        text: DIAGNOSIS_PROMPT.to_string(),
      },
      Part::InlineData {
        inline_data: InlineData {
          mime_type: image.mime.clone(),
          data: image.base64.clone(),
        },
      },
    ];
    self.generate(&self.vision_model, parts).await
  }

  pub async fn suggest_remedies(&self, diagnosis: &str) -> Result<String, RemoteError> {
    let parts = vec![Part::Text {
      text: remedy_prompt(diagnosis),
    }];
    self.generate(&self.text_model, parts).await
  }

  // One single-turn generateContent call. The key rides as a query parameter,
  // so reqwest errors are stripped of their URL before they become messages.
  async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String, RemoteError> {
    let url = format!(
      "{}/models/{}:generateContent?key={}",
      self.api_base, model, self.api_key
    );
    let payload = GenerateRequest {
      contents: vec![Content {
        role: Some("user".to_string()),
        parts,
      }],
    };

    let resp = self
      .http
      .post(&url)
      .json(&payload)
      .send()
      .await
      .map_err(|err| RemoteError::RequestFailed(err.without_url().to_string()))?;

    if !resp.status().is_success() {
      let upstream_status = resp.status();
      let text = resp
        .text()
        .await
        .unwrap_or_else(|_| "Gemini request failed.".to_string());
      return Err(RemoteError::RequestFailed(format!(
        "Gemini error ({upstream_status}): {text}"
      )));
    }

    let body = resp
      .json::<GenerateResponse>()
      .await
      .map_err(|err| RemoteError::RequestFailed(err.without_url().to_string()))?;

    let text = extract_text(&body).ok_or(RemoteError::EmptyResponse)?;
    Ok(normalize(text))
  }
}

fn extract_text(response: &GenerateResponse) -> Option<&str> {
  response
    .candidates
    .first()?
    .content
    .parts
    .iter()
    .find_map(|part| match part {
      Part::Text { text } => Some(text.as_str()),
      Part::InlineData { .. } => None,
    })
}

// Cosmetic only: the models like to sprinkle markdown emphasis into prose.
fn normalize(text: &str) -> String {
  text.replace('*', "").trim().to_string()
}
