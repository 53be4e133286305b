//! Graph terms and triples.

use std::fmt;

/// Characters that may not appear inside `<...>`.
const FORBIDDEN_URI_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\'];

/// An absolute URI used as a subject, predicate, graph or object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uri(String);

impl Uri {
    /// Creates a URI without validation.
    ///
    /// Use [`Uri::parse`] for text that comes from outside the process.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a URI, rejecting text that could not be written as `<uri>`.
    pub fn parse(value: impl Into<String>) -> crate::CodecResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(crate::CodecError::InvalidUri {
                uri: value,
                reason: "empty",
            });
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(crate::CodecError::InvalidUri {
                uri: value,
                reason: "contains whitespace",
            });
        }
        if value.contains(FORBIDDEN_URI_CHARS) {
            return Err(crate::CodecError::InvalidUri {
                uri: value,
                reason: "contains a reserved character",
            });
        }
        Ok(Self(value))
    }

    /// Returns the URI text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last non-empty path segment, used as a local identifier.
    pub fn local_name(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit(['/', '#'])
            .next()
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// A resource.
    Uri(Uri),
    /// A literal with an optional datatype.
    Literal {
        /// Lexical value.
        value: String,
        /// Datatype URI; `None` means a plain string.
        datatype: Option<Uri>,
    },
}

impl Term {
    /// A plain string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    /// A literal with a datatype.
    pub fn typed(value: impl Into<String>, datatype: Uri) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype),
        }
    }

    /// A resource term.
    pub fn uri(value: impl Into<Uri>) -> Self {
        Term::Uri(value.into())
    }

    /// Returns the URI if this is a resource.
    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Term::Uri(uri) => Some(uri),
            Term::Literal { .. } => None,
        }
    }

    /// Returns the lexical value if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal { value, .. } => Some(value),
            Term::Uri(_) => None,
        }
    }
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::Uri(uri)
    }
}

/// A subject-predicate-object fact scoped to a named graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    /// Subject resource.
    pub subject: Uri,
    /// Predicate resource.
    pub predicate: Uri,
    /// Object term.
    pub object: Term,
    /// Named graph the triple lives in.
    pub graph: Uri,
}

impl Triple {
    /// Creates a triple.
    pub fn new(subject: Uri, predicate: Uri, object: Term, graph: Uri) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unwritable_uris() {
        assert!(Uri::parse("http://example.org/a").is_ok());
        assert!(Uri::parse("").is_err());
        assert!(Uri::parse("http://example.org/a b").is_err());
        assert!(Uri::parse("http://example.org/<a>").is_err());
    }

    #[test]
    fn local_name() {
        let uri = Uri::new("http://example.org/agents/people/15bf29be");
        assert_eq!(uri.local_name(), "15bf29be");
        assert_eq!(Uri::new("http://example.org/ns#Thing").local_name(), "Thing");
        assert_eq!(Uri::new("http://sws.geonames.org/6252001/").local_name(), "6252001");
    }

    #[test]
    fn term_accessors() {
        let term = Term::literal("Stanford");
        assert_eq!(term.as_literal(), Some("Stanford"));
        assert!(term.as_uri().is_none());

        let term = Term::uri("http://example.org/x");
        assert_eq!(term.as_uri().map(Uri::as_str), Some("http://example.org/x"));
    }
}
