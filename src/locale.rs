//! Locale code validation and best-match selection.
//!
//! Matching is case-insensitive but always returns the available code as it
//! was spelled in the document.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

lazy_static! {
    static ref LOCALE_CODE_REGEX: Regex =
        Regex::new(r"^[a-z]{2,3}(-[A-Za-z]{1,8})*$").expect("locale code regex is valid");
}

/// Returns `true` when `code` looks like a BCP 47 language tag (`en`, `en-US`, `zh-Hant-HK`).
pub fn is_locale_code(code: &str) -> bool {
    LOCALE_CODE_REGEX.is_match(code)
}

/// Checks `code` against [`is_locale_code`].
pub fn validate_locale(code: &str) -> Result<(), Error> {
    if is_locale_code(code) {
        Ok(())
    } else {
        Err(Error::InvalidLocale(code.to_string()))
    }
}

/// Finds the best matching locale from `available` for `requested`.
///
/// The matching is performed in the following order:
/// 1. Exact match or fallback to a parent locale (`zh-Hant-HK` -> `zh-Hant` -> `zh`).
/// 2. A more specific child locale (`el` -> `el-GR`).
/// 3. Any locale with the same base language (`en-AU` -> `en-CA`).
///
/// Steps 2 and 3 return the first candidate in `available` order; when several
/// candidates exist, which one wins is otherwise unspecified.
///
/// # Example
///
/// ```rust
/// use tie::locale::best_match;
/// assert_eq!(best_match("zh-Hant-HK", ["zh-Hant", "zh"]), Some("zh-Hant"));
/// assert_eq!(best_match("el", ["el-GR"]), Some("el-GR"));
/// assert_eq!(best_match("fr", ["de"]), None);
/// ```
pub fn best_match<'a, I>(requested: &str, available: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let available = available
        .into_iter()
        .map(|code| (code.to_lowercase(), code))
        .collect::<Vec<_>>();
    let requested = requested.to_lowercase();
    let mut parts = requested.split('-').collect::<Vec<_>>();

    // Exact and parent fallback
    while !parts.is_empty() {
        let candidate = parts.join("-");
        if let Some((_, code)) = available.iter().find(|(lower, _)| *lower == candidate) {
            return Some(*code);
        }
        parts.pop();
    }

    // Child fallback
    let child_prefix = format!("{}-", requested);
    if let Some((_, code)) = available
        .iter()
        .find(|(lower, _)| lower.starts_with(&child_prefix))
    {
        return Some(*code);
    }

    // Same base language
    let base = requested.split('-').next().unwrap_or_default();
    let base_prefix = format!("{}-", base);
    available
        .iter()
        .find(|(lower, _)| lower.starts_with(&base_prefix))
        .map(|(_, code)| *code)
}

/// Resolves a locale by priority: each entry of `priority` goes through
/// [`best_match`] in turn, the first hit wins.
///
/// With `use_fallbacks`, a miss on every priority locale settles for the first
/// available well-formed locale code instead of `None`.
pub fn resolve<'a, I>(priority: &[&str], available: I, use_fallbacks: bool) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let available = available.into_iter();
    priority
        .iter()
        .find_map(|locale| best_match(locale, available.clone()))
        .or_else(|| {
            if use_fallbacks {
                available.clone().find(|code| is_locale_code(code))
            } else {
                None
            }
        })
}
