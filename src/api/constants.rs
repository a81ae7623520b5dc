//! API constants for the Dataverse Web API

/// Dataverse Web API version
pub const API_VERSION: &str = "v9.2";

/// Base API path for Dataverse
pub const API_BASE_PATH: &str = "/api/data";

/// Host suffix shared by every Dataverse environment
pub const CRM_HOST_SUFFIX: &str = "crm.dynamics.com";

/// Azure AD login host used to build the authority URL
pub const LOGIN_HOST: &str = "https://login.microsoftonline.com";

/// Scope suffix that requests every permission granted to the app
pub const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

/// Token endpoint path, relative to the authority
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth2/v2.0/token";

/// Full API path with version
pub fn api_path() -> String {
    format!("{}/{}/", API_BASE_PATH, API_VERSION)
}

/// Build the environment root URL for an organization
pub fn env_url(org: &str) -> String {
    format!("https://{}.{}", org, CRM_HOST_SUFFIX)
}

/// Build the Web API base URL for an organization (always ends in `/`)
pub fn api_url(org: &str) -> String {
    format!("{}{}", env_url(org), api_path())
}

/// Standard headers for Dataverse requests
pub mod headers {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const ODATA_MAX_VERSION: &str = "OData-MaxVersion";
    pub const ODATA_VERSION_HEADER: &str = "OData-Version";
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const PREFER: &str = "Prefer";

    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// OData version header
    pub const ODATA_VERSION: &str = "4.0";

    /// Prefer header for returning representation
    pub const PREFER_RETURN_REPRESENTATION: &str = "return=representation";
}

/// OData system query options
pub mod options {
    pub const FILTER: &str = "$filter";
    pub const ORDER_BY: &str = "$orderby";
    pub const TOP: &str = "$top";
    pub const COUNT: &str = "$count";
    pub const SELECT: &str = "$select";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("orgc1997c24"),
            "https://orgc1997c24.crm.dynamics.com/api/data/v9.2/"
        );
    }

    #[test]
    fn test_env_url() {
        assert_eq!(env_url("contoso"), "https://contoso.crm.dynamics.com");
    }
}
