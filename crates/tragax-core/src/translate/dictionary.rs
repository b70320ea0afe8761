//! Bundled and loadable word/phrase dictionaries.
//!
//! A dictionary holds, per language pair, single-word entries with ranked
//! translations and a phrase table of two- and three-word sequences. Keys are
//! stored normalized (see [`super::normalize`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::normalize;

/// One headword with its translations, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    pub translations: Vec<String>,
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub part_of_speech: Option<String>,
}

/// A dictionary file for one language pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryPack {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub entries: Vec<DictionaryEntry>,
    /// Multi-word phrases (bigrams and trigrams) to translations, best first.
    #[serde(default, alias = "bigrams")]
    pub phrases: HashMap<String, Vec<String>>,
}

impl DictionaryPack {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[derive(Debug, Clone, Default)]
struct PairTable {
    words: HashMap<String, DictionaryEntry>,
    phrases: HashMap<String, Vec<String>>,
}

/// Dictionary lookups keyed by language pair.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    pairs: HashMap<(String, String), PairTable>,
}

impl Dictionary {
    /// A dictionary with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in English/French word list, plus its reverse direction.
    pub fn bundled() -> Self {
        let mut dictionary = Self::empty();
        let pack = bundled_en_fr();
        let reverse = reverse_pack(&pack);
        dictionary.add_pack(pack);
        dictionary.add_pack(reverse);
        dictionary
    }

    /// Merge a pack. Existing headwords are replaced.
    pub fn add_pack(&mut self, pack: DictionaryPack) {
        let table = self
            .pairs
            .entry((pack.from.to_lowercase(), pack.to.to_lowercase()))
            .or_default();
        for entry in pack.entries {
            if entry.translations.is_empty() {
                continue;
            }
            table.words.insert(normalize(&entry.word), entry);
        }
        for (phrase, translations) in pack.phrases {
            if !translations.is_empty() {
                table.phrases.insert(normalize(&phrase), translations);
            }
        }
    }

    fn table(&self, from: &str, to: &str) -> Option<&PairTable> {
        self.pairs.get(&(from.to_lowercase(), to.to_lowercase()))
    }

    pub fn has_pair(&self, from: &str, to: &str) -> bool {
        self.table(from, to).is_some()
    }

    /// Exact lookup of already-normalized text as a word or a phrase.
    pub fn lookup(&self, normalized: &str, from: &str, to: &str) -> Option<&str> {
        let table = self.table(from, to)?;
        table
            .words
            .get(normalized)
            .and_then(|e| e.translations.first())
            .or_else(|| table.phrases.get(normalized).and_then(|t| t.first()))
            .map(String::as_str)
    }

    /// Best translation of a single normalized word.
    pub fn word(&self, word: &str, from: &str, to: &str) -> Option<&str> {
        self.table(from, to)?
            .words
            .get(word)
            .and_then(|e| e.translations.first())
            .map(String::as_str)
    }

    /// All translations of a single normalized word, best first.
    pub fn senses(&self, word: &str, from: &str, to: &str) -> &[String] {
        self.table(from, to)
            .and_then(|t| t.words.get(word))
            .map(|e| e.translations.as_slice())
            .unwrap_or(&[])
    }

    /// First known trigram, then bigram, found anywhere in `words`.
    pub fn phrase_in(&self, words: &[&str], from: &str, to: &str) -> Option<&str> {
        let table = self.table(from, to)?;
        for width in [3usize, 2] {
            if words.len() < width {
                continue;
            }
            for window in words.windows(width) {
                if let Some(found) = table.phrases.get(&window.join(" ")) {
                    return found.first().map(String::as_str);
                }
            }
        }
        None
    }

    /// Number of headwords and phrases across all pairs.
    pub fn len(&self) -> usize {
        self.pairs
            .values()
            .map(|t| t.words.len() + t.phrases.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn entry(word: &str, translations: &[&str], frequency: u32, pos: &str) -> DictionaryEntry {
    DictionaryEntry {
        word: word.to_string(),
        translations: translations.iter().map(|t| t.to_string()).collect(),
        frequency,
        part_of_speech: Some(pos.to_string()),
    }
}

fn bundled_en_fr() -> DictionaryPack {
    let entries = vec![
        entry("hello", &["bonjour", "salut"], 100, "interjection"),
        entry("world", &["monde"], 90, "noun"),
        entry("book", &["livre"], 85, "noun"),
        entry("car", &["voiture"], 85, "noun"),
        entry("house", &["maison"], 85, "noun"),
        entry("dog", &["chien"], 80, "noun"),
        entry("cat", &["chat"], 80, "noun"),
        entry("yes", &["oui"], 95, "adverb"),
        entry("no", &["non"], 95, "adverb"),
        entry("thank you", &["merci"], 95, "phrase"),
        entry("please", &["s'il vous plaît"], 90, "adverb"),
        entry("sorry", &["désolé"], 80, "adjective"),
        entry("goodbye", &["au revoir"], 85, "interjection"),
        entry("computer", &["ordinateur"], 80, "noun"),
        entry("beautiful", &["beau", "belle", "magnifique"], 70, "adjective"),
        entry("quickly", &["rapidement", "vite"], 60, "adverb"),
        entry("water", &["eau"], 75, "noun"),
        entry("bread", &["pain"], 60, "noun"),
        entry("friend", &["ami", "amie"], 70, "noun"),
        entry("good", &["bon", "bonne"], 90, "adjective"),
        entry("morning", &["matin"], 65, "noun"),
        entry("night", &["nuit"], 65, "noun"),
        entry("day", &["jour"], 80, "noun"),
        entry("school", &["école"], 60, "noun"),
        entry("apple", &["pomme"], 55, "noun"),
    ];
    let phrases = [
        ("good morning", &["bonjour", "bon matin"][..]),
        ("good night", &["bonne nuit"][..]),
        ("thank you", &["merci", "merci beaucoup"][..]),
        ("how are", &["comment allez"][..]),
        ("are you", &["êtes-vous", "allez-vous"][..]),
        ("how are you", &["comment allez-vous", "comment ça va"][..]),
        ("what is this", &["qu'est-ce que c'est"][..]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
    .collect();

    DictionaryPack {
        from: "en".into(),
        to: "fr".into(),
        entries,
        phrases,
    }
}

/// Invert a pack: every translation becomes a headword pointing back at the
/// source word. The first source word seen for a translation wins.
fn reverse_pack(pack: &DictionaryPack) -> DictionaryPack {
    let mut seen: HashMap<String, DictionaryEntry> = HashMap::new();
    let mut order = Vec::new();
    for e in &pack.entries {
        for t in &e.translations {
            let key = normalize(t);
            if !seen.contains_key(&key) {
                order.push(key.clone());
                seen.insert(
                    key,
                    DictionaryEntry {
                        word: t.clone(),
                        translations: vec![e.word.clone()],
                        frequency: e.frequency,
                        part_of_speech: e.part_of_speech.clone(),
                    },
                );
            }
        }
    }
    DictionaryPack {
        from: pack.to.clone(),
        to: pack.from.clone(),
        entries: order
            .into_iter()
            .filter_map(|k| seen.remove(&k))
            .collect(),
        phrases: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_lookup() {
        let dict = Dictionary::bundled();
        assert_eq!(dict.lookup("hello", "en", "fr"), Some("bonjour"));
        assert_eq!(dict.lookup("thank you", "en", "fr"), Some("merci"));
        assert_eq!(dict.lookup("how are you", "en", "fr"), Some("comment allez-vous"));
        assert_eq!(dict.lookup("hello", "en", "es"), None);
        assert_eq!(dict.senses("beautiful", "en", "fr").len(), 3);
    }

    #[test]
    fn reverse_direction_is_derived() {
        let dict = Dictionary::bundled();
        assert_eq!(dict.lookup("chien", "fr", "en"), Some("dog"));
        assert_eq!(dict.lookup("salut", "fr", "en"), Some("hello"));
        assert_eq!(dict.lookup("désolé", "fr", "en"), Some("sorry"));
    }

    #[test]
    fn phrase_scan_prefers_trigrams() {
        let dict = Dictionary::bundled();
        let words = ["so", "how", "are", "you"];
        assert_eq!(dict.phrase_in(&words, "en", "fr"), Some("comment allez-vous"));
        let words = ["well", "good", "night"];
        assert_eq!(dict.phrase_in(&words, "en", "fr"), Some("bonne nuit"));
        assert_eq!(dict.phrase_in(&["alone"], "en", "fr"), None);
    }

    #[test]
    fn pack_from_json() {
        let json = r#"{
            "from": "en",
            "to": "es",
            "entries": [
                {"word": "Dog", "translations": ["perro"], "frequency": 80, "partOfSpeech": "noun"},
                {"word": "ghost", "translations": []}
            ],
            "bigrams": {"good morning": ["buenos días"]}
        }"#;
        let pack = DictionaryPack::from_json(json).unwrap();
        let mut dict = Dictionary::empty();
        dict.add_pack(pack);
        assert!(dict.has_pair("EN", "ES"));
        assert_eq!(dict.word("dog", "en", "es"), Some("perro"));
        assert_eq!(dict.word("ghost", "en", "es"), None);
        assert_eq!(dict.lookup("good morning", "en", "es"), Some("buenos días"));
        assert_eq!(dict.len(), 2);
    }
}
