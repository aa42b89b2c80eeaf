//! Content languages and translated text fields.

use serde::{Deserialize, Serialize};

/// Languages the storefront publishes content in. Spanish is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Es,
    En,
}

impl Lang {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Parse a language tag such as `en`, `EN` or `es-PE`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let primary = raw.trim().split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Resolve an optional query value, falling back to the default language.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }
}

/// A text field carried in every published language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub es: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    #[must_use]
    pub fn new(es: impl Into<String>, en: impl Into<String>) -> Self {
        Self { es: es.into(), en: en.into() }
    }

    /// Text for `lang`; untranslated fields fall back to Spanish, then English.
    #[must_use]
    pub fn get(&self, lang: Lang) -> &str {
        let preferred = match lang {
            Lang::Es => &self.es,
            Lang::En => &self.en,
        };
        if !preferred.is_empty() {
            return preferred;
        }
        if self.es.is_empty() { &self.en } else { &self.es }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_region_tags() {
        assert_eq!(Lang::parse("es-PE"), Some(Lang::Es));
        assert_eq!(Lang::parse("EN_us"), Some(Lang::En));
        assert_eq!(Lang::parse("fr"), None);
    }

    #[test]
    fn from_query_defaults_to_spanish() {
        assert_eq!(Lang::from_query(None), Lang::Es);
        assert_eq!(Lang::from_query(Some("de")), Lang::Es);
        assert_eq!(Lang::from_query(Some("en")), Lang::En);
    }

    #[test]
    fn get_falls_back_when_untranslated() {
        let text = LocalizedText::new("Lago Titicaca", "");
        assert_eq!(text.get(Lang::En), "Lago Titicaca");

        let english_only = LocalizedText::new("", "Lake Titicaca");
        assert_eq!(english_only.get(Lang::Es), "Lake Titicaca");
    }
}
