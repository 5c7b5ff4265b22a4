use std::collections::HashMap;

use serde::Deserialize;

use crate::fallback::DataError;
use crate::language::{Language, pair_key};

const BUILTIN: &str = include_str!("../../data/phrasebook.toml");

#[derive(Debug, Default, Deserialize)]
struct PairTable {
    #[serde(default)]
    phrases: HashMap<String, String>,
    #[serde(default)]
    words: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PhrasebookFile {
    #[serde(default)]
    pairs: HashMap<String, PairTable>,
}

/// How an offline translation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    WordLevel,
    /// Nothing matched; the input is echoed back.
    Untranslated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineTranslation {
    pub text: String,
    pub kind: MatchKind,
}

/// Phrase and word tables keyed by ordered language pair (`english-hindi`).
#[derive(Debug)]
pub struct Phrasebook {
    pairs: HashMap<String, PairTable>,
}

impl Phrasebook {
    /// The phrasebook compiled into the binary.
    pub fn builtin() -> Result<Self, DataError> {
        Self::from_toml(BUILTIN)
    }

    pub fn from_toml(source: &str) -> Result<Self, DataError> {
        let file: PhrasebookFile = toml::from_str(source).map_err(|source| DataError::Parse {
            asset: "phrasebook",
            source,
        })?;

        // Word lookups are done on lowercased input, so normalize keys once here.
        let pairs = file
            .pairs
            .into_iter()
            .map(|(key, table)| {
                let words = table
                    .words
                    .into_iter()
                    .map(|(w, t)| (w.to_lowercase(), t))
                    .collect();
                (
                    key.to_lowercase(),
                    PairTable {
                        phrases: table.phrases,
                        words,
                    },
                )
            })
            .collect();

        Ok(Self { pairs })
    }

    pub fn has_pair(&self, from: Language, to: Language) -> bool {
        self.pairs.contains_key(&pair_key(from, to))
    }

    /// Best-effort translation: whole-phrase match, then word-by-word
    /// substitution, then the input unchanged.
    pub fn translate(&self, text: &str, from: Language, to: Language) -> OfflineTranslation {
        let Some(table) = self.pairs.get(&pair_key(from, to)) else {
            return untranslated(text);
        };

        let needle = text.trim();
        if let Some(hit) = table.phrases.get(needle) {
            return OfflineTranslation {
                text: hit.clone(),
                kind: MatchKind::Exact,
            };
        }

        let lowered = needle.to_lowercase();
        if let Some(hit) = table
            .phrases
            .iter()
            .find(|(k, _)| k.to_lowercase() == lowered)
            .map(|(_, v)| v)
        {
            return OfflineTranslation {
                text: hit.clone(),
                kind: MatchKind::CaseInsensitive,
            };
        }

        let mut substituted = 0usize;
        let words: Vec<String> = needle
            .split_whitespace()
            .map(|token| {
                let (lead, core, trail) = split_punctuation(token);
                match table.words.get(&core.to_lowercase()) {
                    Some(t) if !core.is_empty() => {
                        substituted += 1;
                        format!("{lead}{t}{trail}")
                    }
                    _ => token.to_string(),
                }
            })
            .collect();

        if substituted == 0 {
            return untranslated(text);
        }

        OfflineTranslation {
            text: words.join(" "),
            kind: MatchKind::WordLevel,
        }
    }
}

fn untranslated(text: &str) -> OfflineTranslation {
    OfflineTranslation {
        text: text.to_string(),
        kind: MatchKind::Untranslated,
    }
}

/// Split a token into leading punctuation, word, trailing punctuation.
/// Only ASCII punctuation is peeled so combining marks in Indic scripts stay
/// attached to their word.
fn split_punctuation(token: &str) -> (&str, &str, &str) {
    let start = token
        .find(|c: char| !c.is_ascii_punctuation())
        .unwrap_or(token.len());
    let end = token
        .rfind(|c: char| !c.is_ascii_punctuation())
        .map(|i| i + token[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(start);
    let end = end.max(start);
    (&token[..start], &token[start..end], &token[end..])
}
