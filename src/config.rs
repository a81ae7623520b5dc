//! Client configuration
//!
//! Settings are layered from, highest precedence first: explicit
//! [`ConfigOverrides`], `DATAVERSE_*` environment variables, a `.env` file, a
//! secrets file and a YAML file in the per-application data directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use figment::value::{Dict, Value};
use log::{debug, info};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::api::constants;
use crate::error::{DataverseError, Result};

pub const ENV_PREFIX: &str = "DATAVERSE_";
pub const APP_DIR_NAME: &str = "dataverse-client";
pub const CONFIG_FILE_NAME: &str = "config.yml";
pub const SECRETS_FILE_NAME: &str = "secrets.yml";
pub const DOTENV_FILE_NAME: &str = ".env";

pub const DEFAULT_DOMAIN: &str = "alleninstitute.org";
pub const DEFAULT_REQUEST_TIMEOUT_S: f64 = 30.0;

fn default_additional_scopes() -> Vec<String> {
    vec!["offline_access".to_string()]
}

/// Immutable client settings. Derived URLs are computed from the stored fields
/// on every call.
#[derive(Debug)]
pub struct DataverseConfig {
    tenant_id: String,
    client_id: String,
    org: String,
    username: String,
    password: SecretString,
    domain: String,
    additional_scopes: Vec<String>,
    request_timeout_s: f64,
}

/// Where settings are read from
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub env: bool,
    pub dotenv_file: Option<PathBuf>,
    pub secrets_file: Option<PathBuf>,
    pub yaml_file: Option<PathBuf>,
}

/// Explicit settings; any field set here wins over every other source
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub org: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub domain: Option<String>,
    pub additional_scopes: Option<Vec<String>>,
    pub request_timeout_s: Option<f64>,
}

/// Settings as found in the layered sources, before validation
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default, deserialize_with = "lenient_string")]
    tenant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    password: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    domain: Option<String>,
    #[serde(default, deserialize_with = "scope_list")]
    additional_scopes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    request_timeout_s: Option<f64>,
}

impl ConfigSources {
    /// Environment, `./.env`, the platform config dir secrets file and the
    /// platform data dir `config.yml`
    pub fn platform() -> Self {
        Self {
            env: true,
            dotenv_file: Some(PathBuf::from(DOTENV_FILE_NAME)),
            secrets_file: dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SECRETS_FILE_NAME)),
            yaml_file: dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }

    /// No sources at all; only explicit overrides apply
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: bool) -> Self {
        self.env = env;
        self
    }

    pub fn with_dotenv_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv_file = Some(path.into());
        self
    }

    pub fn with_secrets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_file = Some(path.into());
        self
    }

    pub fn with_yaml_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.yaml_file = Some(path.into());
        self
    }

    /// Merge the file and environment layers, lowest precedence first
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new();

        if let Some(path) = &self.yaml_file {
            debug!("Reading settings from YAML file: {:?}", path);
            figment = figment.merge(Yaml::file(path));
        }
        if let Some(path) = &self.secrets_file {
            debug!("Reading settings from secrets file: {:?}", path);
            figment = figment.merge(Yaml::file(path));
        }
        if let Some(path) = &self.dotenv_file {
            figment = figment.merge(Serialized::defaults(read_dotenv(path)?));
        }
        if self.env {
            figment = figment.merge(Serialized::defaults(read_env()));
        }

        Ok(figment)
    }
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn additional_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn request_timeout_s(mut self, seconds: f64) -> Self {
        self.request_timeout_s = Some(seconds);
        self
    }
}

impl DataverseConfig {
    /// Load from the platform sources
    pub fn load() -> Result<Self> {
        Self::from_sources(&ConfigSources::platform(), ConfigOverrides::default())
    }

    /// Load from the platform sources, with explicit settings on top
    pub fn load_with(overrides: ConfigOverrides) -> Result<Self> {
        Self::from_sources(&ConfigSources::platform(), overrides)
    }

    /// Build from explicit settings only
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self> {
        Self::from_sources(&ConfigSources::none(), overrides)
    }

    pub fn from_sources(sources: &ConfigSources, overrides: ConfigOverrides) -> Result<Self> {
        let raw: RawSettings = sources
            .figment()?
            .extract()
            .map_err(|e| DataverseError::Configuration(format!("Failed to read settings: {}", e)))?;

        let config = Self::resolve(raw, overrides)?;
        info!(
            "Loaded Dataverse config for org {} (tenant {})",
            config.org, config.tenant_id
        );
        Ok(config)
    }

    fn resolve(raw: RawSettings, overrides: ConfigOverrides) -> Result<Self> {
        let tenant_id = overrides.tenant_id.or(raw.tenant_id);
        let client_id = overrides.client_id.or(raw.client_id);
        let org = overrides.org.or(raw.org);
        let username = overrides.username.or(raw.username);
        let password = overrides.password.or(raw.password.map(SecretString::from));

        let missing: Vec<&str> = [
            ("tenant_id", tenant_id.is_none()),
            ("client_id", client_id.is_none()),
            ("org", org.is_none()),
            ("username", username.is_none()),
            ("password", password.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(tenant_id), Some(client_id), Some(org), Some(username), Some(password)) =
            (tenant_id, client_id, org, username, password)
        else {
            let vars: Vec<String> = missing
                .iter()
                .map(|name| format!("{}{}", ENV_PREFIX, name.to_uppercase()))
                .collect();
            return Err(DataverseError::Configuration(format!(
                "missing required setting(s): {} (set {} or add them to {})",
                missing.join(", "),
                vars.join(", "),
                CONFIG_FILE_NAME
            )));
        };

        let request_timeout_s = overrides
            .request_timeout_s
            .or(raw.request_timeout_s)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_S);
        if !(request_timeout_s.is_finite() && request_timeout_s > 0.0) {
            return Err(DataverseError::Configuration(format!(
                "request_timeout_s must be a positive number of seconds, got {}",
                request_timeout_s
            )));
        }

        Ok(Self {
            tenant_id,
            client_id,
            org,
            username,
            password,
            domain: overrides
                .domain
                .or(raw.domain)
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            additional_scopes: overrides
                .additional_scopes
                .or(raw.additional_scopes)
                .unwrap_or_else(default_additional_scopes),
            request_timeout_s,
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn additional_scopes(&self) -> &[String] {
        &self.additional_scopes
    }

    pub fn request_timeout_s(&self) -> f64 {
        self.request_timeout_s
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_s)
    }

    /// Base URL for the Dataverse API, ending in `/`
    pub fn api_url(&self) -> String {
        constants::api_url(&self.org)
    }

    /// Base URL for the Dataverse environment
    pub fn env_url(&self) -> String {
        constants::env_url(&self.org)
    }

    /// Azure AD authority for the tenant
    pub fn authority(&self) -> String {
        format!("{}/{}", constants::LOGIN_HOST, self.tenant_id)
    }

    /// OAuth scope: the environment's `.default` scope followed by the additional scopes
    pub fn scope(&self) -> String {
        let mut scopes = vec![format!("{}{}", self.env_url(), constants::DEFAULT_SCOPE_SUFFIX)];
        scopes.extend(self.additional_scopes.iter().cloned());
        scopes.join(" ")
    }

    /// Username qualified with `@{domain}` unless it already is
    pub fn username_at_domain(&self) -> String {
        let suffix = format!("@{}", self.domain);
        if self.username.ends_with(&suffix) {
            self.username.clone()
        } else {
            format!("{}{}", self.username, suffix)
        }
    }
}

/// `DATAVERSE_*` entries of a dotenv file, keyed like the environment layer.
/// The process environment is left untouched. A missing file is not an error.
fn read_dotenv(path: &Path) -> Result<Dict> {
    if !path.exists() {
        debug!("No dotenv file at {:?}", path);
        return Ok(Dict::new());
    }

    debug!("Reading settings from dotenv file: {:?}", path);
    let entries = dotenvy::from_path_iter(path).map_err(|e| {
        DataverseError::Configuration(format!("Failed to read dotenv file {:?}: {}", path, e))
    })?;

    let pairs = entries
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            DataverseError::Configuration(format!("Failed to parse dotenv file {:?}: {}", path, e))
        })?;

    Ok(prefixed_settings(pairs))
}

/// `DATAVERSE_*` variables of the process environment. Non-UTF-8 entries are skipped.
fn read_env() -> Dict {
    prefixed_settings(
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
    )
}

/// Strip the prefix and lowercase the key. Values stay verbatim strings, so
/// `007` or `[pa,ss]` reach the settings exactly as written.
fn prefixed_settings<I>(pairs: I) -> Dict
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, raw)| {
            let field = key.strip_prefix(ENV_PREFIX)?;
            Some((field.to_lowercase(), Value::from(raw)))
        })
        .collect()
}

/// YAML scalars arrive typed (`org: 1234` is a number).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(|scalar| Some(scalar.into_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

/// Number from YAML, or text from the environment layers
fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Seconds::deserialize(deserializer)? {
        Seconds::Number(seconds) => Ok(Some(seconds)),
        Seconds::Text(text) => text.trim().parse().map(Some).map_err(|_| {
            serde::de::Error::custom(format!(
                "request_timeout_s must be a number of seconds, got {:?}",
                text
            ))
        }),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeList {
    List(Vec<String>),
    Joined(String),
}

/// Accepts a YAML list or a single comma or space separated string, optionally bracketed
fn scope_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let scopes = match ScopeList::deserialize(deserializer)? {
        ScopeList::List(scopes) => scopes,
        ScopeList::Joined(joined) => joined
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(Some(scopes))
}
