use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Japanese];

    /// Routing token from the dropdown: "japanese" selects the Japanese
    /// flow, anything else falls through to English.
    pub fn from_token(token: &str) -> Self {
        if token == "japanese" {
            Language::Japanese
        } else {
            Language::English
        }
    }

    pub fn wire_token(self) -> &'static str {
        match self {
            Language::Japanese => "japanese",
            Language::English => "english",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Language::Japanese => "Japanese",
            Language::English => "English",
        }
    }

    pub fn generator_tag(self) -> &'static str {
        match self {
            Language::Japanese => "japanese_anki_generator",
            Language::English => "english_anki_generator",
        }
    }

    /// Script detection: Japanese iff the text contains Hiragana, Katakana,
    /// or CJK ideographs.
    pub fn detect(text: &str) -> Self {
        let japanese = text.chars().any(|c| {
            ('\u{3040}'..='\u{309F}').contains(&c)
                || ('\u{30A0}'..='\u{30FF}').contains(&c)
                || ('\u{4E00}'..='\u{9FFF}').contains(&c)
        });
        if japanese {
            Language::Japanese
        } else {
            Language::English
        }
    }
}

/// Deck name from a dropdown token: first letter upper-cased, the rest
/// lower-cased ("japanese" -> "Japanese").
pub fn deck_name_for_token(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
