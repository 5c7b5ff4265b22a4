use serde::Serialize;

/// Languages the translation surface accepts by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    English,
    Hindi,
    Bengali,
    Tamil,
    Telugu,
    Marathi,
    Gujarati,
    Kannada,
    Malayalam,
    Punjabi,
    Urdu,
    Spanish,
    French,
    German,
    Japanese,
    Chinese,
}

pub const DEFAULT_LANGUAGE: Language = Language::English;

impl Language {
    pub const ALL: [Language; 16] = [
        Self::English,
        Self::Hindi,
        Self::Bengali,
        Self::Tamil,
        Self::Telugu,
        Self::Marathi,
        Self::Gujarati,
        Self::Kannada,
        Self::Malayalam,
        Self::Punjabi,
        Self::Urdu,
        Self::Spanish,
        Self::French,
        Self::German,
        Self::Japanese,
        Self::Chinese,
    ];

    /// Resolve a display name ("Hindi") or a code ("hi"). Unknown input falls
    /// back to `DEFAULT_LANGUAGE` instead of failing the request.
    pub fn resolve(name: &str) -> Language {
        let needle = name.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(needle) || l.code().eq_ignore_ascii_case(needle))
            .unwrap_or_else(|| {
                tracing::debug!(language = needle, "unknown language, using default");
                DEFAULT_LANGUAGE
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Bengali => "Bengali",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Marathi => "Marathi",
            Self::Gujarati => "Gujarati",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Punjabi => "Punjabi",
            Self::Urdu => "Urdu",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Japanese => "Japanese",
            Self::Chinese => "Chinese",
        }
    }

    /// ISO 639-1 code understood by every translation provider.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Bengali => "bn",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Marathi => "mr",
            Self::Gujarati => "gu",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Punjabi => "pa",
            Self::Urdu => "ur",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Japanese => "ja",
            Self::Chinese => "zh",
        }
    }
}

/// Key of a language pair in the offline phrasebook, e.g. `english-hindi`.
pub fn pair_key(from: Language, to: Language) -> String {
    format!(
        "{}-{}",
        from.name().to_lowercase(),
        to.name().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(Language::resolve("hindi"), Language::Hindi);
        assert_eq!(Language::resolve("  Tamil "), Language::Tamil);
        assert_eq!(Language::resolve("FRENCH").code(), "fr");
    }

    #[test]
    fn resolves_codes() {
        assert_eq!(Language::resolve("es"), Language::Spanish);
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        assert_eq!(Language::resolve("Klingon"), DEFAULT_LANGUAGE);
        assert_eq!(Language::resolve("").code(), "en");
    }

    #[test]
    fn pair_key_is_ordered_and_lowercase() {
        assert_eq!(pair_key(Language::English, Language::Hindi), "english-hindi");
        assert_eq!(pair_key(Language::Hindi, Language::English), "hindi-english");
    }
}
