/// Seed templates for first-time setup
///
/// A new account gets one list, a set of categories and a set of items, all
/// named in the account's language. [`SeedTemplate::builtin`] is the starter
/// kit shipped with the application: a list called "Food", 17 emoji-prefixed
/// categories and 116 common groceries.
///
/// # Languages
///
/// Templates are translated into English, Norwegian and Lithuanian. Every entry
/// has an English name; a missing translation falls back to it, entry by entry.
///
/// # Example
///
/// ```
/// use cartlist_engine::seed::{resolve_language, Language, SeedTemplate};
///
/// let language = resolve_language(Some("lt"), Some("en"));
/// assert_eq!(language, Language::Lt);
///
/// let template = SeedTemplate::builtin();
/// assert_eq!(template.list_name(language), "Maistas");
/// assert_eq!(template.categories.len(), 17);
/// ```

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported language
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, the fallback for everything
    #[default]
    En,

    /// Norwegian
    No,

    /// Lithuanian
    Lt,
}

impl Language {
    /// Every supported language
    pub const ALL: [Language; 3] = [Language::En, Language::No, Language::Lt];

    /// Language code
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::No => "no",
            Language::Lt => "lt",
        }
    }

    fn column(&self) -> usize {
        match self {
            Language::En => 0,
            Language::No => 1,
            Language::Lt => 2,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language code that is not supported
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "no" => Ok(Language::No),
            "lt" => Ok(Language::Lt),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Picks the seed language for an account
///
/// The first non-blank code wins: the sign-up language, then the display
/// language. No code at all means English, and so does a code that is not
/// supported.
pub fn resolve_language(signup_language: Option<&str>, display_language: Option<&str>) -> Language {
    let code = [signup_language, display_language]
        .into_iter()
        .flatten()
        .find(|code| !code.trim().is_empty());

    match code {
        Some(code) => code.parse().unwrap_or_else(|err: UnknownLanguage| {
            tracing::debug!(error = %err, "Falling back to English seed data");
            Language::En
        }),
        None => Language::En,
    }
}

/// Text with per-language variants and an English fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    english: String,
    others: BTreeMap<Language, String>,
}

impl Translations {
    /// Text known only in English
    pub fn new(english: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            others: BTreeMap::new(),
        }
    }

    /// Adds or replaces a translation
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        let text = text.into();
        match language {
            Language::En => self.english = text,
            other => {
                self.others.insert(other, text);
            }
        }
        self
    }

    /// Text in `language`, or English if that translation is missing or blank
    pub fn get(&self, language: Language) -> &str {
        self.others
            .get(&language)
            .filter(|text| !text.trim().is_empty())
            .map(String::as_str)
            .unwrap_or(&self.english)
    }

    fn from_columns(columns: [&str; 3]) -> Self {
        Language::ALL
            .into_iter()
            .skip(1)
            .fold(Self::new(columns[0]), |translations, language| {
                translations.with(language, columns[language.column()])
            })
    }
}

/// One seed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    /// Item name
    pub names: Translations,

    /// Position of the item's category in [`SeedTemplate::categories`]
    pub category: Option<usize>,

    /// Quantity to buy
    pub quantity: i32,
}

impl SeedItem {
    /// Item with quantity 1
    pub fn new(names: Translations, category: Option<usize>) -> Self {
        Self {
            names,
            category,
            quantity: 1,
        }
    }

    /// Sets the quantity
    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Everything first-time setup creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTemplate {
    /// Name of the starter list
    pub list_name: Translations,

    /// Categories in display order
    pub categories: Vec<Translations>,

    /// Items in display order
    pub items: Vec<SeedItem>,
}

impl SeedTemplate {
    /// The starter kit shipped with the application
    pub fn builtin() -> Self {
        Self {
            list_name: Translations::from_columns(builtin::LIST_NAME),
            categories: builtin::CATEGORIES
                .iter()
                .map(|columns| Translations::from_columns(*columns))
                .collect(),
            items: builtin::ITEMS
                .iter()
                .map(|(columns, category, quantity)| {
                    SeedItem::new(Translations::from_columns(*columns), Some(*category))
                        .with_quantity(*quantity)
                })
                .collect(),
        }
    }

    /// List name in `language`
    pub fn list_name(&self, language: Language) -> &str {
        self.list_name.get(language)
    }
}
