//! Entry identifiers
//!
//! A row is addressed either by its primary key or by one alternate key column.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EntryId {
    /// Primary key, inserted into the URL as-is
    Id(String),
    /// Alternate key column and its value
    AlternateKey { column: String, value: KeyValue },
}

/// Value of an alternate key. Strings are quoted in URLs, everything else is a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl EntryId {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn alternate_key(column: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        Self::AlternateKey {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Build an alternate key from a column/value mapping.
    ///
    /// Only the first pair yielded by the iterator is used; any further pairs are
    /// ignored (and logged). Returns `None` for an empty mapping.
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<KeyValue>,
    {
        let mut pairs = pairs.into_iter();
        let (column, value) = pairs.next()?;
        let entry = Self::alternate_key(column, value);

        let ignored = pairs.count();
        if ignored > 0 {
            log::warn!(
                "Alternate key mapping has {} extra pair(s); only {} is used",
                ignored,
                entry
            );
        }

        Some(entry)
    }

    /// URL segment for this identifier, parentheses included
    pub fn to_segment(&self) -> String {
        format!("({})", self)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Id(id) => f.write_str(id),
            EntryId::AlternateKey { column, value } => write!(f, "{}={}", column, value),
        }
    }
}

impl KeyValue {
    /// Render as it appears inside a key segment
    pub fn to_odata_string(&self) -> String {
        match self {
            KeyValue::String(s) => format!("'{}'", s),
            KeyValue::Integer(i) => i.to_string(),
            // keep the fractional part: 1.0 renders as `1.0`, not `1`
            KeyValue::Number(n) => format!("{:?}", n),
            KeyValue::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_odata_string())
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<&String> for EntryId {
    fn from(id: &String) -> Self {
        Self::Id(id.clone())
    }
}

impl<K: Into<String>, V: Into<KeyValue>> From<(K, V)> for EntryId {
    fn from((column, value): (K, V)) -> Self {
        Self::alternate_key(column, value)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for KeyValue {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i32> for KeyValue {
    fn from(i: i32) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<i64> for KeyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for KeyValue {
    fn from(i: u32) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<f64> for KeyValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for KeyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
