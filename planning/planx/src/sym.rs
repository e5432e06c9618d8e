use crate::errors::{Span, Spanned};
use std::{
    borrow::Cow,
    fmt::{Debug, Display},
};

/// Symbol in the model, possibly annotated with its origin (file/line)
#[derive(Clone)]
pub struct Sym {
    /// Canonical view of the symbol, used for comparison and hashing.
    /// Short identifiers are stored inline.
    symbol: compact_str::CompactString,
    /// Origin of the symbol. If set, the display view of the symbol is read from it.
    pub span: Option<Span>,
}

impl Sym {
    pub fn with_source<'a>(s: impl Into<Cow<'a, str>>, source: Span) -> Sym {
        Sym {
            symbol: s.into().into(),
            span: Some(source),
        }
    }

    pub fn canonical_str(&self) -> &str {
        self.symbol.as_str()
    }

    /// Returns true if the canonical view of the symbol contains `pattern`.
    pub fn contains(&self, pattern: &str) -> bool {
        self.symbol.contains(pattern)
    }
}

impl AsRef<str> for Sym {
    fn as_ref(&self) -> &str {
        &self.symbol
    }
}

impl std::borrow::Borrow<str> for Sym {
    fn borrow(&self) -> &str {
        &self.symbol
    }
}

impl From<&str> for Sym {
    fn from(value: &str) -> Self {
        Sym {
            symbol: value.into(),
            span: None,
        }
    }
}

impl From<String> for Sym {
    fn from(value: String) -> Self {
        Sym {
            symbol: value.into(),
            span: None,
        }
    }
}

impl From<&Sym> for Sym {
    fn from(value: &Sym) -> Self {
        value.clone()
    }
}

impl Spanned for Sym {
    fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }
}

impl Debug for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Display for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = match self.span.as_ref() {
            Some(span) => span.str(),
            None => self.symbol.as_str(),
        };
        write!(f, "{view}")
    }
}

impl PartialEq for Sym {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl PartialEq<str> for Sym {
    fn eq(&self, other: &str) -> bool {
        self.canonical_str() == other
    }
}

impl PartialEq<&str> for Sym {
    fn eq(&self, other: &&str) -> bool {
        self.canonical_str() == *other
    }
}

impl Eq for Sym {}

impl PartialOrd for Sym {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sym {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl std::hash::Hash for Sym {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state)
    }
}
