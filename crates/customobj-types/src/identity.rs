//! Addressing for custom objects.
//!
//! A custom object is addressed by a `(container, key)` pair. Both segments
//! must be non-empty and consist only of the characters `[-_~.a-zA-Z0-9]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Punctuation permitted in a container or key besides ASCII alphanumerics.
const ALLOWED_PUNCTUATION: &[char] = &['-', '_', '~', '.'];

/// Validate a single identity segment (`container` or `key`).
///
/// # Examples
///
/// ```
/// use customobj_types::identity::validate_segment;
///
/// assert!(validate_segment("key", "settings.v2").is_ok());
/// assert!(validate_segment("key", "").is_err());
/// assert!(validate_segment("container", "a/b").is_err());
/// ```
pub fn validate_segment(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(TypeError::InvalidSegment {
            field,
            value: value.to_string(),
            reason: "must not be empty".into(),
        });
    }

    if let Some(ch) = value
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !ALLOWED_PUNCTUATION.contains(c))
    {
        return Err(TypeError::InvalidSegment {
            field,
            value: value.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    Ok(())
}

/// The `(container, key)` tuple addressing a custom object.
///
/// Identity is fixed for a given remote object. Renaming either segment means
/// a different remote object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub struct IdentityKey {
    container: String,
    key: String,
}

/// Unvalidated wire form of [`IdentityKey`].
#[derive(Deserialize)]
struct RawIdentity {
    container: String,
    key: String,
}

impl TryFrom<RawIdentity> for IdentityKey {
    type Error = TypeError;

    fn try_from(raw: RawIdentity) -> Result<Self, TypeError> {
        Self::new(raw.container, raw.key)
    }
}

impl IdentityKey {
    /// Build a validated identity.
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Result<Self, TypeError> {
        let container = container.into();
        let key = key.into();
        validate_segment("container", &container)?;
        validate_segment("key", &key)?;
        Ok(Self { container, key })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}
