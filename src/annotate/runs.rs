//! Character-run detection.
//!
//! A *run* is a maximal stretch of Han characters from the three CJK blocks
//! below.  Kana, Hangul, CJK punctuation and the later CJK extensions are not
//! part of any run.

use std::ops::Range;

/// Inclusive code-point ranges treated as the target script.
pub const HAN_RANGES: [(char, char); 3] = [
    ('\u{3400}', '\u{4DB5}'), // CJK Unified Ideographs Extension A
    ('\u{4E00}', '\u{9FCB}'), // CJK Unified Ideographs
    ('\u{F900}', '\u{FA6A}'), // CJK Compatibility Ideographs
];

/// Returns `true` when `c` falls in one of the [`HAN_RANGES`].
///
/// ```
/// use hanzi_ruby::annotate::is_han;
///
/// assert!(is_han('你'));
/// assert!(!is_han('か'));
/// assert!(!is_han('a'));
/// ```
pub fn is_han(c: char) -> bool {
    HAN_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Byte range of the first run in `text`, or `None` when there is none.
///
/// ```
/// use hanzi_ruby::annotate::find_run;
///
/// let text = "say 你好 twice";
/// let range = find_run(text).unwrap();
/// assert_eq!(&text[range], "你好");
/// ```
pub fn find_run(text: &str) -> Option<Range<usize>> {
    let (start, _) = text.char_indices().find(|&(_, c)| is_han(c))?;
    let end = text[start..]
        .char_indices()
        .find(|&(_, c)| !is_han(c))
        .map_or(text.len(), |(offset, _)| start + offset);
    Some(start..end)
}

/// Iterate over every run in `text`, left to right.
pub fn runs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let range = find_run(rest)?;
        let run = &rest[range.clone()];
        rest = &rest[range.end..];
        Some(run)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_run_in_ascii() {
        assert_eq!(find_run("hello world"), None);
        assert_eq!(find_run(""), None);
    }

    #[test]
    fn run_at_start() {
        let text = "你好world";
        assert_eq!(find_run(text), Some(0..6));
    }

    #[test]
    fn run_in_the_middle_is_maximal() {
        let text = "a中文字b";
        let range = find_run(text).unwrap();
        assert_eq!(&text[range], "中文字");
    }

    #[test]
    fn kana_and_punctuation_split_runs() {
        assert_eq!(runs("漢字かな漢字").collect::<Vec<_>>(), vec!["漢字", "漢字"]);
        assert_eq!(runs("你好，世界。").collect::<Vec<_>>(), vec!["你好", "世界"]);
    }

    #[test]
    fn block_boundaries() {
        assert!(is_han('\u{3400}'));
        assert!(is_han('\u{4DB5}'));
        assert!(!is_han('\u{4DB6}'));
        assert!(is_han('\u{9FCB}'));
        assert!(!is_han('\u{9FCC}'));
        assert!(is_han('\u{F900}'));
        assert!(is_han('\u{FA6A}'));
        assert!(!is_han('\u{FA6B}'));
        assert!(!is_han('\u{3042}')); // あ
    }

    #[test]
    fn runs_over_text_without_han_is_empty() {
        assert_eq!(runs("plain").count(), 0);
    }
}
