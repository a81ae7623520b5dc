//! Request URL construction
//!
//! URL = `api_url + table + identifier segment + query segment`. Nothing is
//! percent-encoded: string alternate keys get single quotes and that is all.
//! Callers pass identifiers and filter expressions that are already valid.

use super::entry::EntryId;
use super::options::QueryOptions;

pub fn build_url(
    api_url: &str,
    table: &str,
    entry_id: Option<&EntryId>,
    options: &QueryOptions,
) -> String {
    let identifier = entry_id.map(EntryId::to_segment).unwrap_or_default();
    format!("{}{}{}{}", api_url, table, identifier, options.to_query_string())
}
