//! Client library for the Microsoft Dataverse Web API.
//!
//! ```no_run
//! use dataverse_client::{DataverseClient, DataverseConfig, Query};
//!
//! # async fn run() -> dataverse_client::Result<()> {
//! let client = DataverseClient::connect(DataverseConfig::load()?).await?;
//! let mouse = client.get("crb81_dim_mice_bases", ("crb81_mouse_id", "614174")).await?;
//! let recent = client
//!     .query("crb81_dim_mice_bases", Query::new().filter("crb81_age gt 3").top(5))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;

pub use api::{DataverseClient, EntryId, Query, QueryOptions};
pub use config::{ConfigOverrides, ConfigSources, DataverseConfig};
pub use error::{BoxError, DataverseError, Operation, Result, TransportError};
