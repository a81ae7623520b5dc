//! OData system query options
//!
//! [`QueryOptions`] carries every option the URL builder understands.
//! [`Query`] is the narrower set accepted by `DataverseClient::query`, which
//! returns a bare list and so has no use for `$count`.

use super::columns::Columns;
use crate::api::constants::options;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub order_by: Option<Columns>,
    pub top: Option<u32>,
    pub count: Option<bool>,
    pub select: Option<Columns>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `$filter` expression
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, columns: impl Into<Columns>) -> Self {
        self.order_by = Some(columns.into());
        self
    }

    /// Limit number of results
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Ask for the match count annotation
    pub fn count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn select(mut self, columns: impl Into<Columns>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// `key=value` fragments in OData option order: filter, orderby, top, count, select.
    ///
    /// Presence decides emission, not truthiness: `count(false)` yields `$count=false`.
    pub fn to_fragments(&self) -> Vec<String> {
        let mut fragments = Vec::new();

        if let Some(filter) = &self.filter {
            fragments.push(format!("{}={}", options::FILTER, filter));
        }
        if let Some(order_by) = &self.order_by {
            fragments.push(format!("{}={}", options::ORDER_BY, order_by.to_odata_string()));
        }
        if let Some(top) = self.top {
            fragments.push(format!("{}={}", options::TOP, top));
        }
        if let Some(count) = self.count {
            fragments.push(format!("{}={}", options::COUNT, count));
        }
        if let Some(select) = &self.select {
            fragments.push(format!("{}={}", options::SELECT, select.to_odata_string()));
        }

        fragments
    }

    /// Query string including the leading `?`, or empty when no option is set
    pub fn to_query_string(&self) -> String {
        let fragments = self.to_fragments();
        if fragments.is_empty() {
            String::new()
        } else {
            format!("?{}", fragments.join("&"))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
            && self.order_by.is_none()
            && self.top.is_none()
            && self.count.is_none()
            && self.select.is_none()
    }
}

/// Options accepted by `DataverseClient::query`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<String>,
    pub order_by: Option<Columns>,
    pub top: Option<u32>,
    pub select: Option<Columns>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, columns: impl Into<Columns>) -> Self {
        self.order_by = Some(columns.into());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn select(mut self, columns: impl Into<Columns>) -> Self {
        self.select = Some(columns.into());
        self
    }
}

impl From<Query> for QueryOptions {
    fn from(query: Query) -> Self {
        Self {
            filter: query.filter,
            order_by: query.order_by,
            top: query.top,
            count: None,
            select: query.select,
        }
    }
}
