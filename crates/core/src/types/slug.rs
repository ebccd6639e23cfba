//! URL-safe slug type for categories and tags.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `a-z`, `0-9`, `-`.
    #[error("slug contains invalid character {found:?}")]
    InvalidCharacter {
        /// The offending character.
        found: char,
    },
    /// The input starts or ends with a hyphen, or contains a double hyphen.
    #[error("slug hyphens must separate non-empty segments")]
    BadHyphen,
}

/// A URL-safe identifier for a category or tag.
///
/// Slugs are stored alongside display names so links and filters stay stable
/// when a label is renamed.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Only lowercase ASCII letters, digits, and hyphens
/// - Hyphens must separate non-empty segments (no leading, trailing, or
///   doubled hyphens)
///
/// ## Examples
///
/// ```
/// use widgetvault_core::Slug;
///
/// // Valid slugs
/// assert!(Slug::parse("hero-sections").is_ok());
/// assert!(Slug::parse("cta2").is_ok());
///
/// // Invalid slugs
/// assert!(Slug::parse("").is_err());            // empty
/// assert!(Slug::parse("Hero Sections").is_err()); // uppercase + space
/// assert!(Slug::parse("-hero").is_err());         // leading hyphen
/// assert!(Slug::parse("hero--footer").is_err());  // doubled hyphen
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 64 characters
    /// - Contains characters outside `a-z`, `0-9`, `-`
    /// - Has a leading, trailing, or doubled hyphen
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(found) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter { found });
        }

        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::BadHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_slugs() {
        assert!(Slug::parse("hero").is_ok());
        assert!(Slug::parse("hero-sections").is_ok());
        assert!(Slug::parse("call-to-action").is_ok());
        assert!(Slug::parse("cta2").is_ok());
        assert!(Slug::parse("404-pages").is_ok());
        assert!(Slug::parse("a").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(65);
        assert!(matches!(Slug::parse(&long), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            Slug::parse("Hero"),
            Err(SlugError::InvalidCharacter { found: 'H' })
        ));
        assert!(matches!(
            Slug::parse("hero sections"),
            Err(SlugError::InvalidCharacter { found: ' ' })
        ));
        assert!(matches!(
            Slug::parse("héro"),
            Err(SlugError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_parse_bad_hyphens() {
        assert!(matches!(Slug::parse("-hero"), Err(SlugError::BadHyphen)));
        assert!(matches!(Slug::parse("hero-"), Err(SlugError::BadHyphen)));
        assert!(matches!(
            Slug::parse("hero--footer"),
            Err(SlugError::BadHyphen)
        ));
    }

    #[test]
    fn test_display() {
        let slug = Slug::parse("hero-sections").unwrap();
        assert_eq!(format!("{slug}"), "hero-sections");
    }

    #[test]
    fn test_serde_roundtrip() {
        let slug = Slug::parse("hero-sections").unwrap();
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"hero-sections\"");

        let parsed: Slug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }

    #[test]
    fn test_from_str() {
        let slug: Slug = "hero-sections".parse().unwrap();
        assert_eq!(slug.as_str(), "hero-sections");
    }

    #[test]
    fn test_as_ref() {
        let slug = Slug::parse("hero-sections").unwrap();
        let s: &str = slug.as_ref();
        assert_eq!(s, "hero-sections");
    }
}
