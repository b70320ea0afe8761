//! Offline fallback translator.
//!
//! Produces *something* for any input without network access: known phrases
//! first, then word-by-word dictionary lookups, and for unknown words a crude
//! affix rewrite with random accents. The output is not meant to be accurate.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::dictionary::Dictionary;
use super::normalize;

/// Suffix rewrites per target language, longest match first.
const FR_SUFFIXES: &[(&str, &str)] = &[
    ("ically", "iquement"),
    ("ical", "ique"),
    ("tion", "tion"),
    ("sion", "sion"),
    ("ism", "isme"),
    ("ist", "iste"),
    ("ity", "ité"),
    ("ous", "eux"),
    ("ive", "if"),
    ("ary", "aire"),
    ("ly", "ment"),
    ("ic", "ique"),
    ("or", "eur"),
    ("er", "eur"),
    ("y", "ie"),
];

const FR_PREFIXES: &[(&str, &str)] = &[("un", "in"), ("dis", "dé"), ("re", "ré")];

const ES_SUFFIXES: &[(&str, &str)] = &[
    ("tion", "ción"),
    ("ity", "idad"),
    ("ous", "oso"),
    ("ly", "mente"),
    ("ic", "ico"),
    ("ive", "ivo"),
];

const ES_PREFIXES: &[(&str, &str)] = &[("dis", "des")];

/// Lossy translator that never fails.
pub struct OfflineTranslator {
    rng: Mutex<StdRng>,
    accent_probability: f64,
}

impl Default for OfflineTranslator {
    fn default() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }
}

impl OfflineTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic output for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            accent_probability: 0.3,
        }
    }

    /// Probability that an inner `e` gains an accent. Clamped to `[0, 1]`.
    pub fn with_accent_probability(mut self, probability: f64) -> Self {
        self.accent_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn translate(&self, dictionary: &Dictionary, text: &str, from: &str, to: &str) -> String {
        let normalized = normalize(text);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if words.is_empty() {
            return text.trim().to_string();
        }

        if words.len() > 1 {
            if let Some(phrase) = dictionary.phrase_in(&words, from, to) {
                return phrase.to_string();
            }
        }

        words
            .iter()
            .map(|w| match dictionary.word(w, from, to) {
                Some(known) => known.to_string(),
                None => self.transform(w, to),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn transform(&self, word: &str, to: &str) -> String {
        let (prefixes, suffixes) = match to.to_lowercase().as_str() {
            "fr" => (FR_PREFIXES, FR_SUFFIXES),
            "es" => (ES_PREFIXES, ES_SUFFIXES),
            _ => (&[][..], &[][..]),
        };

        let mut out = word.to_lowercase();
        if let Some((old, new)) = prefixes
            .iter()
            .find(|(p, _)| out.starts_with(p) && out.len() > p.len() + 2)
        {
            out = format!("{new}{}", &out[old.len()..]);
        }
        if let Some((old, new)) = suffixes
            .iter()
            .find(|(s, _)| out.ends_with(s) && out.len() > s.len() + 1)
        {
            out = format!("{}{new}", &out[..out.len() - old.len()]);
        }

        if self.accent_probability > 0.0 {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let chars: Vec<char> = out.chars().collect();
            let last = chars.len().saturating_sub(1);
            out = chars
                .into_iter()
                .enumerate()
                .map(|(i, c)| {
                    if c == 'e' && i > 0 && i < last && rng.random_bool(self.accent_probability) {
                        'é'
                    } else {
                        c
                    }
                })
                .collect();
        }
        out
    }
}
