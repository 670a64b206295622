use base64::Engine;

use crate::models::EncodedImage;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IngestError {
  #[error("Selected file is not an image. Pick a JPG, PNG, or WebP photo.")]
  NotAnImage,
}

/// Accepts any `image/*` content type; no size cap, no magic-byte sniffing,
/// no recompression. The bytes go out to the model exactly as uploaded.
pub fn encode_image(content_type: &str, bytes: &[u8]) -> Result<EncodedImage, IngestError> {
  if !content_type.starts_with("image/") {
    return Err(IngestError::NotAnImage);
  }

  let base64 = base64::engine::general_purpose::STANDARD.encode(bytes);
  Ok(EncodedImage {
    mime: content_type.to_string(),
    base64,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_non_image_content_types() {
    assert_eq!(
      encode_image("application/pdf", b"%PDF-1.4"),
      Err(IngestError::NotAnImage)
    );
    assert_eq!(encode_image("text/plain", b"hello"), Err(IngestError::NotAnImage));
    assert_eq!(encode_image("", b"x"), Err(IngestError::NotAnImage));
  }

  #[test]
  fn accepts_any_image_subtype() {
    assert!(encode_image("image/png", &[0x89, 0x50]).is_ok());
    assert!(encode_image("image/webp", &[0x52, 0x49]).is_ok());
  }

  #[test]
  fn keeps_the_content_type() {
    let image = encode_image("image/jpeg", &[0xff, 0xd8]).unwrap();
    assert_eq!(image.mime, "image/jpeg");
  }

  #[test]
  fn base64_round_trips_the_bytes() {
    let original = [0u8, 1, 2, 250, 251, 252, 253, 254, 255];
    let image = encode_image("image/png", &original).unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
      .decode(image.base64)
      .unwrap();
    assert_eq!(decoded, original);
  }

  #[test]
  fn no_data_url_prefix() {
    let image = encode_image("image/png", &[1, 2, 3]).unwrap();
    assert!(!image.base64.starts_with("data:"));
  }
}
