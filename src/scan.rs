use tokio::sync::RwLock;

use crate::gemini::GeminiClient;
use crate::models::{EncodedImage, ImageMeta, ScanSnapshot, ScanStatus};
use crate::render;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScanError {
  #[error("Select a plant photo before scanning.")]
  NoImageSelected,
  #[error("A scan is already running.")]
  ScanInFlight,
}

/// The whole app state: one selected image and the results it produced.
/// Diagnosis and solutions are only meaningful for the current image, so
/// every image change clears them.
pub struct ScanState {
  pub image: Option<EncodedImage>,
  pub diagnosis: Option<String>,
  pub solutions: Option<String>,
  pub error: Option<String>,
  pub status: ScanStatus,
}

impl Default for ScanState {
  fn default() -> Self {
    Self {
      image: None,
      diagnosis: None,
      solutions: None,
      error: None,
      status: ScanStatus::Idle,
    }
  }
}

impl ScanState {
  pub fn select_image(&mut self, image: EncodedImage) {
    self.image = Some(image);
    self.diagnosis = None;
    self.solutions = None;
    self.error = None;
  }

  /// A failed selection drops the previous image too, not just the results.
  pub fn reject_image(&mut self, message: String) {
    self.image = None;
    self.diagnosis = None;
    self.solutions = None;
    self.error = Some(message);
  }

  pub fn snapshot(&self) -> ScanSnapshot {
    ScanSnapshot {
      status: self.status,
      image: self.image.as_ref().map(|image| ImageMeta {
        mime: image.mime.clone(),
        size_bytes: image.size_bytes(),
      }),
      diagnosis: self.diagnosis.as_deref().map(render::section),
      solutions: self.solutions.as_deref().map(render::section),
      error: self.error.clone(),
    }
  }
}

/// Guard and entry transition. Returns the image the scan will run on.
pub fn begin(state: &mut ScanState) -> Result<EncodedImage, ScanError> {
  if state.status == ScanStatus::Scanning {
    return Err(ScanError::ScanInFlight);
  }
  let Some(image) = state.image.clone() else {
    state.error = Some(ScanError::NoImageSelected.to_string());
    return Err(ScanError::NoImageSelected);
  };
  state.error = None;
  state.diagnosis = None;
  state.solutions = None;
  state.status = ScanStatus::Scanning;
  Ok(image)
}

pub fn record_diagnosis(state: &mut ScanState, text: String) {
  state.diagnosis = Some(text);
}

/// Failure exit. An already recorded diagnosis stays on display.
pub fn fail(state: &mut ScanState, message: String) {
  state.error = Some(message);
  state.status = ScanStatus::Idle;
}

pub fn complete(state: &mut ScanState, solutions: String) {
  state.solutions = Some(solutions);
  state.status = ScanStatus::Idle;
}

/// The two-step pipeline: diagnose, then remedies, strictly in that order and
/// only on success of the first call. The lock is never held across a network
/// round trip; each transition reacquires it.
pub async fn run(scan: &RwLock<ScanState>, client: &GeminiClient) -> Result<(), ScanError> {
  let image = begin(&mut *scan.write().await)?;

  let diagnosis = match client.diagnose(&image).await {
    Ok(text) => text,
    Err(err) => {
      fail(&mut *scan.write().await, err.to_string());
      return Ok(());
    }
  };
  record_diagnosis(&mut *scan.write().await, diagnosis.clone());

  match client.suggest_remedies(&diagnosis).await {
    Ok(text) => complete(&mut *scan.write().await, text),
    Err(err) => fail(&mut *scan.write().await, err.to_string()),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn leaf_image() -> EncodedImage {
    EncodedImage {
      mime: "image/png".to_string(),
      base64: "aGVsbG8=".to_string(),
    }
  }

  #[test]
  fn begin_without_image_is_guarded() {
    let mut state = ScanState::default();
    assert_eq!(begin(&mut state), Err(ScanError::NoImageSelected));
    assert_eq!(state.status, ScanStatus::Idle);
    assert!(state.error.is_some());
  }

  #[test]
  fn begin_while_scanning_is_rejected() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    begin(&mut state).unwrap();
    assert_eq!(begin(&mut state), Err(ScanError::ScanInFlight));
  }

  #[test]
  fn begin_clears_previous_results() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    state.diagnosis = Some("old diagnosis".to_string());
    state.solutions = Some("old solutions".to_string());
    state.error = Some("old error".to_string());

    let image = begin(&mut state).unwrap();
    assert_eq!(image, leaf_image());
    assert_eq!(state.status, ScanStatus::Scanning);
    assert!(state.diagnosis.is_none());
    assert!(state.solutions.is_none());
    assert!(state.error.is_none());
  }

  #[test]
  fn diagnosis_failure_leaves_solutions_empty_and_returns_to_idle() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    begin(&mut state).unwrap();

    fail(&mut state, "Gemini error (500): boom".to_string());
    assert_eq!(state.status, ScanStatus::Idle);
    assert!(state.solutions.is_none());
    assert!(state.diagnosis.is_none());
    assert_eq!(state.error.as_deref(), Some("Gemini error (500): boom"));
  }

  #[test]
  fn remedy_failure_keeps_the_diagnosis() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    begin(&mut state).unwrap();
    record_diagnosis(&mut state, "Leaf spot".to_string());

    fail(&mut state, "timed out".to_string());
    assert_eq!(state.status, ScanStatus::Idle);
    assert_eq!(state.diagnosis.as_deref(), Some("Leaf spot"));
    assert!(state.solutions.is_none());
    assert!(state.error.is_some());
  }

  #[test]
  fn full_success_leaves_both_results_and_no_error() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    begin(&mut state).unwrap();
    record_diagnosis(&mut state, "Aphid infestation".to_string());
    complete(&mut state, "Use neem oil\n- keep leaves dry".to_string());

    assert_eq!(state.status, ScanStatus::Idle);
    assert!(state.diagnosis.is_some());
    assert!(state.solutions.is_some());
    assert!(state.error.is_none());
  }

  #[test]
  fn selecting_a_new_image_clears_results() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    record_diagnosis(&mut state, "Rust fungus".to_string());
    state.solutions = Some("spray".to_string());

    state.select_image(EncodedImage {
      mime: "image/jpeg".to_string(),
      base64: "Zg==".to_string(),
    });
    assert!(state.diagnosis.is_none());
    assert!(state.solutions.is_none());
    assert_eq!(state.image.as_ref().unwrap().mime, "image/jpeg");
  }

  #[test]
  fn rejecting_an_image_drops_the_previous_one() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    state.reject_image("not an image".to_string());
    assert!(state.image.is_none());
    assert_eq!(state.error.as_deref(), Some("not an image"));
  }

  #[test]
  fn snapshot_carries_split_sections() {
    let mut state = ScanState::default();
    state.select_image(leaf_image());
    record_diagnosis(&mut state, "Leaf spot detected\n- caused by fungus".to_string());

    let snapshot = state.snapshot();
    let diagnosis = snapshot.diagnosis.unwrap();
    assert_eq!(diagnosis.items, vec!["Leaf spot detected", "caused by fungus"]);
    assert_eq!(snapshot.image.unwrap().size_bytes, 5);
    assert!(snapshot.solutions.is_none());
  }
}
