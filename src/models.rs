use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EncodedImage {
  pub mime: String,
  pub base64: String,
}

impl EncodedImage {
  /// Decoded payload size, derived from the padded base64 length.
  pub fn size_bytes(&self) -> usize {
    let padding = self.base64.bytes().rev().take_while(|b| *b == b'=').count();
    self.base64.len() / 4 * 3 - padding
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
  Idle,
  Scanning,
}

#[derive(Serialize, Deserialize)]
pub struct ImageMeta {
  pub mime: String,
  pub size_bytes: usize,
}

/// Result text plus the same text pre-split into display list items.
#[derive(Serialize, Deserialize)]
pub struct ReportSection {
  pub text: String,
  pub items: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ScanSnapshot {
  pub status: ScanStatus,
  pub image: Option<ImageMeta>,
  pub diagnosis: Option<ReportSection>,
  pub solutions: Option<ReportSection>,
  pub error: Option<String>,
}
