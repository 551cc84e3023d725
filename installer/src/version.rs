//! Version token normalisation.
//!
//! Go release identifiers look like `go1.25.1`, `go1.24beta1`, or
//! `go1.25rc2`. Users paste them in many shapes (with or without the `go`
//! prefix, followed by a build timestamp, with trailing punctuation) and
//! `go version` prints them embedded in a longer line. Everything funnels
//! through [`normalize`], which is lenient: it truncates at the first
//! character that cannot appear in an archive name instead of rejecting the
//! input.

use std::fmt;

/// Prefix shared by every Go release identifier.
pub const VERSION_PREFIX: &str = "go";

/// A canonical Go release identifier such as `go1.25.1`.
///
/// The wrapped string always starts with `go` and is followed only by ASCII
/// digits, lowercase ASCII letters, and `.`. The bare prefix is a valid,
/// minimal token.
///
/// # Examples
///
/// ```
/// use go_installer::version::VersionToken;
///
/// let token = VersionToken::normalize("1.25.1 time 2025-08-27T15:49:40Z")
///     .expect("non-empty input");
/// assert_eq!(token.as_str(), "go1.25.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    /// Normalise arbitrary text into a token.
    ///
    /// Returns `None` only when the input is blank.
    #[must_use]
    pub fn normalize(input: &str) -> Option<Self> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Return the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether only the `go` prefix survived normalisation.
    #[must_use]
    pub fn is_minimal(&self) -> bool {
        self.0 == VERSION_PREFIX
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalise user input or command output into a version string.
///
/// 1. Surrounding whitespace is trimmed; blank input is returned as-is.
/// 2. Only the first whitespace-separated field is kept.
/// 3. The `go` prefix is added when missing.
/// 4. After the prefix, digits, lowercase letters, and `.` are kept up to
///    the first other character.
///
/// # Examples
///
/// ```
/// use go_installer::version::normalize;
///
/// assert_eq!(normalize("go1.25.1!"), "go1.25.1");
/// assert_eq!(normalize("1.24beta1"), "go1.24beta1");
/// assert_eq!(normalize("   "), "");
/// ```
#[must_use]
pub fn normalize(input: &str) -> String {
    let Some(first) = input.split_whitespace().next() else {
        return String::new();
    };

    let rest = first.strip_prefix(VERSION_PREFIX).unwrap_or(first);
    let mut token = String::with_capacity(VERSION_PREFIX.len() + rest.len());
    token.push_str(VERSION_PREFIX);
    token.extend(rest.chars().take_while(|c| is_version_char(*c)));
    token
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_lowercase() || c == '.'
}

/// Extract the version token from `go version` output.
///
/// The expected shape is `go version go1.22.6 linux/amd64`. When the third
/// field is missing or does not carry the prefix, every field is scanned for
/// the first one that starts with `go` and normalises to more than the bare
/// prefix.
///
/// # Examples
///
/// ```
/// use go_installer::version::parse_version_output;
///
/// let token = parse_version_output("go version go1.22.6 linux/amd64");
/// assert_eq!(token.map(|t| t.to_string()), Some("go1.22.6".to_owned()));
/// assert!(parse_version_output("totally unrelated output").is_none());
/// ```
#[must_use]
pub fn parse_version_output(output: &str) -> Option<VersionToken> {
    let fields: Vec<&str> = output.split_whitespace().collect();

    if let Some(third) = fields.get(2).filter(|f| f.starts_with(VERSION_PREFIX)) {
        return VersionToken::normalize(third);
    }

    fields
        .iter()
        .filter(|field| field.starts_with(VERSION_PREFIX))
        .filter_map(|field| VersionToken::normalize(field))
        .find(|token| !token.is_minimal())
}
