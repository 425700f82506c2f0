//! Run → transcription converters.
//!
//! [`Converter`] is the black box the resolver calls for every cache miss.
//! It never fails: an unknown run yields `None`, which the resolver treats as
//! "not known yet".
//!
//! [`PinyinConverter`] is the production implementation, backed by the
//! `pinyin` crate's tone-marked readings.  [`MockConverter`] (available under
//! `#[cfg(test)]`) answers from a fixed table and records every call.

use pinyin::ToPinyin;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Converter trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe transcription source.
pub trait Converter: Send + Sync {
    /// Transcribe one run, or `None` when it cannot be read.
    fn convert(&self, run: &str) -> Option<String>;

    /// Transcribe a batch; one [`convert`](Converter::convert) call per run
    /// unless an implementation can do better.
    fn convert_batch(&self, runs: &[String]) -> Vec<Option<String>> {
        runs.iter().map(|run| self.convert(run)).collect()
    }
}

// Compile-time assertion: Box<dyn Converter> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Converter>) {}
};

// ---------------------------------------------------------------------------
// PinyinConverter
// ---------------------------------------------------------------------------

/// Hanyu Pinyin with tone marks, one syllable per character, separated by
/// single spaces: `你好` → `nǐ hǎo`.
///
/// Compatibility ideographs (U+F900–U+FA6A) are read through their NFC
/// unified form.  Each character gets its most common reading, so words
/// whose reading depends on context (`银行` → `yín xíng`) come out
/// character by character.
///
/// Characters without a reading are kept as-is in their position; a run in
/// which no character has a reading converts to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinConverter;

impl PinyinConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Converter for PinyinConverter {
    fn convert(&self, run: &str) -> Option<String> {
        let normalized: String = run.nfc().collect();
        let mut known = false;
        let syllables: Vec<String> = normalized
            .chars()
            .zip(normalized.as_str().to_pinyin())
            .map(|(ch, reading)| match reading {
                Some(p) => {
                    known = true;
                    p.with_tone().to_string()
                }
                None => ch.to_string(),
            })
            .collect();

        known.then(|| syllables.join(" "))
    }
}

// ---------------------------------------------------------------------------
// MockConverter
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockConverter;

#[cfg(test)]
mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::Converter;

    /// Table-driven converter that records every run it is asked about.
    pub struct MockConverter {
        table: HashMap<String, String>,
        echo: bool,
        calls: Mutex<Vec<String>>,
        batches: Mutex<Vec<usize>>,
    }

    impl MockConverter {
        /// Answer only from `entries`; anything else is `None`.
        pub fn with_table(entries: &[(&str, &str)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                echo: false,
                calls: Mutex::new(Vec::new()),
                batches: Mutex::new(Vec::new()),
            }
        }

        /// Answer every run with `py(<run>)`.
        pub fn echo() -> Self {
            Self {
                echo: true,
                ..Self::with_table(&[])
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Size of every batch handed to `convert_batch`.
        pub fn batches(&self) -> Vec<usize> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl Converter for MockConverter {
        fn convert(&self, run: &str) -> Option<String> {
            self.calls.lock().unwrap().push(run.to_string());
            match self.table.get(run) {
                Some(value) => Some(value.clone()),
                None if self.echo => Some(format!("py({run})")),
                None => None,
            }
        }

        fn convert_batch(&self, runs: &[String]) -> Vec<Option<String>> {
            self.batches.lock().unwrap().push(runs.len());
            runs.iter().map(|run| self.convert(run)).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
