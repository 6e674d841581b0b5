//! Requested scope sets.

use serde_json::Value as JsonValue;

use crate::error::{AuthError, AuthResult};

/// A normalized scope request.
///
/// Holds non-empty scope strings in the order they were requested. A single
/// string input is split on whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(Vec<String>);

impl Scopes {
    /// No scopes: callers get the SSO token itself.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse a space-delimited scope string.
    #[must_use]
    pub fn parse(scopes: &str) -> Self {
        Self(scopes.split_whitespace().map(str::to_string).collect())
    }

    /// Build from a list of scopes. Entries are split on whitespace, so blank
    /// entries vanish.
    #[must_use]
    pub fn from_list<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            scopes
                .into_iter()
                .flat_map(|s| {
                    s.as_ref().split_whitespace().map(str::to_string).collect::<Vec<_>>()
                })
                .collect(),
        )
    }

    /// Accept scopes from untyped JSON input: a string, an array of strings, or null.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for any other shape.
    pub fn from_json(value: &JsonValue) -> AuthResult<Self> {
        match value {
            JsonValue::Null => Ok(Self::empty()),
            JsonValue::String(s) => Ok(Self::parse(s)),
            JsonValue::Array(items) => {
                let mut scopes = Vec::with_capacity(items.len());
                for item in items {
                    let Some(s) = item.as_str() else {
                        return Err(AuthError::invalid_parameter(
                            "The type of scopes is not valid, it must be string or string array",
                        ));
                    };
                    scopes.push(s);
                }
                Ok(Self::from_list(scopes))
            }
            _ => Err(AuthError::invalid_parameter(
                "The type of scopes is not valid, it must be string or string array",
            )),
        }
    }

    /// True when no scope was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scopes in request order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Space-joined scopes in request order, as sent on the wire.
    #[must_use]
    pub fn to_scope_string(&self) -> String {
        self.0.join(" ")
    }

    /// Sorted, de-duplicated, space-joined form used for cache keys.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut sorted: Vec<&str> = self.0.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.join(" ")
    }
}

impl From<&str> for Scopes {
    fn from(scopes: &str) -> Self {
        Self::parse(scopes)
    }
}

impl From<String> for Scopes {
    fn from(scopes: String) -> Self {
        Self::parse(&scopes)
    }
}

impl From<Vec<String>> for Scopes {
    fn from(scopes: Vec<String>) -> Self {
        Self::from_list(scopes)
    }
}

impl From<&[&str]> for Scopes {
    fn from(scopes: &[&str]) -> Self {
        Self::from_list(scopes)
    }
}

impl<const N: usize> From<[&str; N]> for Scopes {
    fn from(scopes: [&str; N]) -> Self {
        Self::from_list(scopes)
    }
}
