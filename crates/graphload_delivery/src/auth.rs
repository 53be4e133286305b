//! Request credentials.

use std::fmt;

/// Header carrying an API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Credentials attached to every request of a client.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Arbitrary headers, such as an API key.
    Headers(Vec<(String, String)>),
    /// OAuth2 bearer token.
    Bearer(String),
}

impl Auth {
    /// Creates an API key credential.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::Headers(vec![(API_KEY_HEADER.to_string(), key.into())])
    }

    /// Creates a bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Returns the headers to send.
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            Self::Headers(headers) => headers.clone(),
            Self::Bearer(token) => vec![("Authorization".to_string(), format!("Bearer {token}"))],
        }
    }
}

// Values are secrets; only header names are printed.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headers(headers) => f
                .debug_tuple("Headers")
                .field(&headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>())
                .finish(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_header() {
        assert_eq!(
            Auth::api_key("k1").headers(),
            vec![("X-Api-Key".to_string(), "k1".to_string())]
        );
    }

    #[test]
    fn bearer_header() {
        assert_eq!(
            Auth::bearer("tok").headers(),
            vec![("Authorization".to_string(), "Bearer tok".to_string())]
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let printed = format!("{:?} {:?}", Auth::api_key("k1"), Auth::bearer("tok"));
        assert!(printed.contains("X-Api-Key"));
        assert!(!printed.contains("k1"));
        assert!(!printed.contains("tok"));
    }
}
