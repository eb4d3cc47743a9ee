//! Locale resolution for MangaDex localized fields
//!
//! MangaDex returns titles, descriptions, alt-titles and tag names as maps
//! from a locale code to text. This module collapses such a map into the
//! single string shown to the user.
//!
//! # Examples
//!
//! ```
//! use manga_shelf::locale::{resolve_or, LocalizedText};
//!
//! let mut title = LocalizedText::new();
//! title.insert("ja".to_string(), "ワンピース".to_string());
//! title.insert("en".to_string(), "One Piece".to_string());
//!
//! assert_eq!(resolve_or(&title, &["en", "ja"], "Untitled"), "One Piece");
//! assert_eq!(resolve_or(&LocalizedText::new(), &["en"], "Untitled"), "Untitled");
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Locale code to text. Ordered so the last-resort fallback is deterministic.
pub type LocalizedText = BTreeMap<String, String>;

/// Fallback used for titles that cannot be resolved at all
pub const UNTITLED: &str = "Untitled";

/// Pick the display value from `text`.
///
/// Walks `priority` in order and returns the first non-empty value. When no
/// priority locale matches, the first non-empty value in key order wins.
/// Empty strings count as missing.
pub fn resolve<'a, S: AsRef<str>>(text: &'a LocalizedText, priority: &[S]) -> Option<&'a str> {
    priority
        .iter()
        .filter_map(|locale| text.get(locale.as_ref()))
        .chain(text.values())
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

/// Same as [`resolve`] but returns an owned string, using `fallback` when
/// nothing resolves.
pub fn resolve_or<S: AsRef<str>>(text: &LocalizedText, priority: &[S], fallback: &str) -> String {
    resolve(text, priority).unwrap_or(fallback).to_string()
}

/// Resolve a work title, falling back to its alt-titles.
///
/// Alt-titles are only consulted for priority locales, so a stray
/// romanization in some unrelated locale does not become the headline.
pub fn resolve_title<S: AsRef<str>>(
    title: &LocalizedText,
    alt_titles: &[LocalizedText],
    priority: &[S],
    fallback: &str,
) -> String {
    if let Some(main) = resolve(title, priority) {
        return main.to_string();
    }
    alt_titles
        .iter()
        .find_map(|alt| {
            priority
                .iter()
                .filter_map(|locale| alt.get(locale.as_ref()))
                .find(|value| !value.is_empty())
        })
        .map(String::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Resolve every map in `items`, dropping the ones that resolve to nothing.
pub fn resolve_all<S: AsRef<str>>(items: &[LocalizedText], priority: &[S]) -> Vec<String> {
    items
        .iter()
        .filter_map(|text| resolve(text, priority))
        .map(str::to_string)
        .collect()
}

/// Lenient decoder for localized maps.
///
/// MangaDex encodes an empty map as `[]`, and occasionally sends `null`.
/// Anything that is not an object becomes an empty map; non-string values
/// inside an object are skipped.
pub fn deserialize_localized<'de, D>(deserializer: D) -> Result<LocalizedText, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(localized_from_value(value))
}

pub(crate) fn localized_from_value(value: Value) -> LocalizedText {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(locale, text)| match text {
                Value::String(s) if !locale.is_empty() => Some((locale, s)),
                _ => None,
            })
            .collect(),
        _ => LocalizedText::new(),
    }
}

/// Lenient decoder for a list of localized maps (`altTitles`).
pub fn deserialize_localized_list<'de, D>(deserializer: D) -> Result<Vec<LocalizedText>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().map(localized_from_value).collect(),
        _ => Vec::new(),
    })
}
