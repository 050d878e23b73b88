//! Line-range replacements

use crate::error::{Error, Result};

/// Replace lines `begin..end` (1-based, end exclusive) with `text`. `begin == end` inserts
/// before line `begin`; no text deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub begin: usize,
    pub end: usize,
    pub text: Option<String>,
}

impl Replacement {
    pub fn insert(at: usize, text: String) -> Self {
        Self {
            begin: at,
            end: at,
            text: Some(text),
        }
    }

    pub fn delete(begin: usize, end: usize) -> Self {
        Self { begin, end, text: None }
    }

    pub fn replace(begin: usize, end: usize, text: String) -> Self {
        Self {
            begin,
            end,
            text: Some(text),
        }
    }
}

/// Apply `replacements` to `lines`, last lines first so earlier ranges stay valid.
///
/// Inserts at the same line keep their recorded order. Overlapping ranges are an error and
/// leave `lines` untouched.
pub fn apply_replacements(lines: &mut Vec<String>, replacements: &[Replacement]) -> Result<()> {
    let mut order: Vec<usize> = (0..replacements.len()).collect();
    order.sort_by(|&a, &b| {
        replacements[b]
            .begin
            .cmp(&replacements[a].begin)
            .then(replacements[b].end.cmp(&replacements[a].end))
            .then(b.cmp(&a))
    });

    let mut floor = usize::MAX;
    for &index in &order {
        let replacement = &replacements[index];
        if replacement.end < replacement.begin || replacement.end > floor {
            return Err(Error::Overlap(replacement.begin));
        }
        floor = replacement.begin;
    }

    for &index in &order {
        let replacement = &replacements[index];
        let begin = (replacement.begin.max(1) - 1).min(lines.len());
        let end = (replacement.end.max(1) - 1).clamp(begin, lines.len());
        let text = replacement
            .text
            .as_deref()
            .map(|text| text.lines().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        lines.splice(begin..end, text);
    }
    Ok(())
}

/// Join lines, trimming trailing whitespace at the end of the file, with one final newline.
pub fn finish_text(lines: &[String]) -> String {
    let mut text = lines.join("\n").trim_end().to_string();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_applied_from_the_bottom() {
        let mut content = lines("a\nb\nc\nd");
        let replacements = vec![
            Replacement::replace(1, 2, "A1\nA2".to_string()),
            Replacement::delete(3, 4),
            Replacement::insert(5, "e".to_string()),
        ];
        apply_replacements(&mut content, &replacements).unwrap();
        assert_eq!(content, lines("A1\nA2\nb\nd\ne"));
    }

    #[test]
    fn test_inserts_at_same_line_keep_order() {
        let mut content = lines("a\nb");
        let replacements = vec![
            Replacement::insert(2, "first".to_string()),
            Replacement::insert(2, "second".to_string()),
        ];
        apply_replacements(&mut content, &replacements).unwrap();
        assert_eq!(content, lines("a\nfirst\nsecond\nb"));
    }

    #[test]
    fn test_overlap_is_rejected() {
        let mut content = lines("a\nb\nc");
        let replacements = vec![Replacement::delete(1, 3), Replacement::delete(2, 4)];
        assert!(matches!(apply_replacements(&mut content, &replacements), Err(Error::Overlap(1))));
        assert_eq!(content, lines("a\nb\nc"));
    }

    #[test]
    fn test_finish_text() {
        assert_eq!(finish_text(&lines("a\n\nb  \n\n\n")), "a\n\nb\n");
    }
}
