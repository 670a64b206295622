use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

#[derive(Clone, Copy)]
enum Level {
  Info,
  Warn,
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Level::Info => f.write_str("INFO"),
      Level::Warn => f.write_str("WARN"),
    }
  }
}

/// Append-only event log. Lines carry an event name, never payloads and
/// never the API key.
pub struct Logger {
  file: Mutex<std::fs::File>,
}

impl Logger {
  pub fn new(path: &Path) -> anyhow::Result<Self> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self {
      file: Mutex::new(file),
    })
  }

  pub fn info(&self, event: &str) {
    self.write(Level::Info, event);
  }

  pub fn warn(&self, event: &str) {
    self.write(Level::Warn, event);
  }

  fn write(&self, level: Level, event: &str) {
    let ts = Utc::now().to_rfc3339();
    let line = format!("[{ts}] {level}: {event}\n");
    if let Ok(mut file) = self.file.lock() {
      let _ = file.write_all(line.as_bytes());
    }
  }
}
