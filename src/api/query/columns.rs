//! Column lists for `$orderby` and `$select`

/// One column or an ordered list of columns.
///
/// Column text is passed through verbatim, so `"createdon desc"` is a valid
/// `$orderby` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    Single(String),
    Many(Vec<String>),
}

impl Columns {
    /// Convert to the OData option value
    pub fn to_odata_string(&self) -> String {
        match self {
            Columns::Single(column) => column.clone(),
            Columns::Many(columns) => columns.join(","),
        }
    }
}

impl From<&str> for Columns {
    fn from(column: &str) -> Self {
        Self::Single(column.to_string())
    }
}

impl From<String> for Columns {
    fn from(column: String) -> Self {
        Self::Single(column)
    }
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Self::Many(columns)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(columns: Vec<&str>) -> Self {
        Self::Many(columns.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Columns {
    fn from(columns: &[&str]) -> Self {
        Self::Many(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(columns: [&str; N]) -> Self {
        Self::Many(columns.iter().map(|c| c.to_string()).collect())
    }
}
