//! Image reference parsing for pulls.

use std::fmt;

const DEFAULT_TAG: &str = "latest";

/// An image reference split into the parts the pull endpoint expects.
///
/// Digest references are pulled as given, with no tag. Untagged references
/// get `latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    repository: String,
    tag: Option<String>,
}

impl ImageReference {
    /// Split `reference` into repository and tag.
    ///
    /// A colon only starts a tag when it comes after the last `/`, so
    /// registry ports such as `localhost:5000/desktop` are kept intact.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.contains('@') {
            return Self {
                repository: String::from(trimmed),
                tag: None,
            };
        }

        match trimmed.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') && !tag.is_empty() => Self {
                repository: String::from(repository),
                tag: Some(String::from(tag)),
            },
            _ => Self {
                repository: String::from(trimmed),
                tag: Some(String::from(DEFAULT_TAG)),
            },
        }
    }

    /// Repository part, including any registry host.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag to pull, or `None` for digest references.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}:{tag}", self.repository),
            None => f.write_str(&self.repository),
        }
    }
}
