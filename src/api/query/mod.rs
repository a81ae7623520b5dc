//! OData URL building
//!
//! Maps entry identifiers and structured query options onto Dataverse Web API URLs.

pub mod columns;
pub mod entry;
pub mod options;
pub mod url;

pub use columns::Columns;
pub use entry::{EntryId, KeyValue};
pub use options::{Query, QueryOptions};
pub use url::build_url;
