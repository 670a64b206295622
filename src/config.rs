use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
  pub listen_addr: String,
  pub api_base: String,
  pub vision_model: String,
  pub text_model: String,
  pub request_timeout_secs: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      listen_addr: "127.0.0.1:8787".to_string(),
      api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
      vision_model: "gemini-2.0-flash".to_string(),
      text_model: "gemini-2.0-flash".to_string(),
      request_timeout_secs: 60,
    }
  }
}

impl AppConfig {
  pub fn validate(&self) -> Result<(), String> {
    if self.listen_addr.trim().is_empty() {
      return Err("listen_addr is empty".to_string());
    }
    if self.api_base.trim().is_empty() {
      return Err("api_base is empty".to_string());
    }
    if self.vision_model.trim().is_empty() || self.text_model.trim().is_empty() {
      return Err("model ids must not be empty".to_string());
    }
    if self.request_timeout_secs == 0 {
      return Err("request_timeout_secs must be at least 1".to_string());
    }
    Ok(())
  }
}

pub fn load_or_init(path: &Path) -> anyhow::Result<AppConfig> {
  if path.exists() {
    let data = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&data)?;
    Ok(config)
  } else {
    let config = AppConfig::default();
    save_config(path, &config)?;
    Ok(config)
  }
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(config)?;
  std::fs::write(path, json)?;
  Ok(())
}

// The key is the one secret: it never goes into the config file and is never
// logged. `.env` is loaded by main before this runs.
pub fn api_key_from_env() -> Result<String, String> {
  let key = std::env::var("GEMINI_API_KEY")
    .map_err(|_| "GEMINI_API_KEY missing. Set it in the environment or .env.".to_string())?;
  if key.trim().is_empty() {
    Err("GEMINI_API_KEY missing. Set it in the environment or .env.".to_string())
  } else {
    Ok(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
  }

  #[test]
  fn validate_rejects_empty_model() {
    let mut config = AppConfig::default();
    config.vision_model = "".to_string();
    assert!(config.validate().is_err());
  }

  #[test]
  fn validate_rejects_zero_timeout() {
    let mut config = AppConfig::default();
    config.request_timeout_secs = 0;
    assert!(config.validate().is_err());
  }
}
