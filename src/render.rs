use crate::models::ReportSection;

/// Splits model prose into display bullets: newline, `•`, and `-` are all
/// treated as item boundaries, segments are trimmed, empties dropped.
pub fn split_bullets(text: &str) -> Vec<String> {
  text
    .split(&['\n', '•', '-'][..])
    .map(str::trim)
    .filter(|segment| !segment.is_empty())
    .map(str::to_string)
    .collect()
}

pub fn section(text: &str) -> ReportSection {
  ReportSection {
    text: text.to_string(),
    items: split_bullets(text),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_line_without_delimiters_is_one_item() {
    assert_eq!(split_bullets("  Healthy plant  "), vec!["Healthy plant"]);
  }

  #[test]
  fn splits_on_newline_and_leading_hyphen() {
    assert_eq!(
      split_bullets("Leaf spot detected\n- caused by fungus"),
      vec!["Leaf spot detected", "caused by fungus"]
    );
  }

  #[test]
  fn splits_on_bullet_characters() {
    assert_eq!(
      split_bullets("• water less • improve drainage"),
      vec!["water less", "improve drainage"]
    );
  }

  #[test]
  fn drops_empty_segments() {
    assert_eq!(split_bullets("\n\n- \n•\n"), Vec::<String>::new());
    assert_eq!(split_bullets(""), Vec::<String>::new());
  }

  #[test]
  fn section_keeps_raw_text_next_to_items() {
    let section = section("a\nb");
    assert_eq!(section.text, "a\nb");
    assert_eq!(section.items, vec!["a", "b"]);
  }
}
