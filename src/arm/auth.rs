//! ARM Authentication
//!
//! Bearer tokens come either from a fixed token (`AZURE_ACCESS_TOKEN` or an
//! explicit value) or from the Azure CLI's cached login.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Environment variable holding a ready-made bearer token
pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";

/// Token expiry buffer in seconds - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Token TTL in seconds assumed when the source reports no expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 60;

#[derive(Clone)]
enum TokenSource {
    Static(String),
    AzureCli { resource: String },
}

/// ARM credentials holder with token caching
#[derive(Clone)]
pub struct ArmCredentials {
    source: TokenSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Output of `az account get-access-token`
#[derive(Deserialize)]
struct CliToken {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Epoch seconds; only reported by recent CLI versions
    #[serde(default)]
    expires_on: Option<i64>,
    /// Local time, `2026-01-01 12:00:00.000000`
    #[serde(rename = "expiresOn", default)]
    expires_on_local: Option<String>,
}

impl CliToken {
    fn expiry(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.expires_on {
            return DateTime::from_timestamp(secs, 0);
        }
        let local = self.expires_on_local.as_deref()?;
        let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl ArmCredentials {
    /// Credentials from `AZURE_ACCESS_TOKEN` when set, otherwise the Azure CLI
    pub fn new(endpoint: &str) -> Self {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Self::from_token(token.trim()),
            _ => Self::azure_cli(endpoint),
        }
    }

    /// Credentials that always hand out `token`
    pub fn from_token(token: &str) -> Self {
        Self {
            source: TokenSource::Static(token.to_string()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Credentials obtained through `az account get-access-token`
    pub fn azure_cli(endpoint: &str) -> Self {
        Self {
            source: TokenSource::AzureCli {
                resource: endpoint.trim_end_matches('/').to_string(),
            },
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        let resource = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::AzureCli { resource } => resource,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let cli_token = fetch_cli_token(resource).await?;
        let expires_at = cli_token
            .expiry()
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
            - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: cli_token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (expires_at - Utc::now()).num_minutes()
        );

        Ok(cli_token.access_token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }
        self.get_token().await
    }
}

async fn fetch_cli_token(resource: &str) -> Result<CliToken> {
    let output = Command::new("az")
        .args(["account", "get-access-token", "--output", "json", "--resource"])
        .arg(resource)
        .output()
        .await
        .context("Failed to run the Azure CLI. Is 'az' installed?")?;

    if !output.status.success() {
        bail!("Azure CLI could not issue a token. Run 'az login'");
    }

    serde_json::from_slice(&output.stdout).context("Failed to parse Azure CLI token output")
}

/// Get the Azure CLI configuration directory
pub fn get_azure_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AZURE_CONFIG_DIR") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|p| p.join(".azure"))
}

/// Subscription ids are GUIDs
fn validate_subscription_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

#[derive(Deserialize)]
struct AzureProfile {
    #[serde(default)]
    subscriptions: Vec<ProfileSubscription>,
}

#[derive(Deserialize)]
struct ProfileSubscription {
    id: String,
    #[serde(rename = "isDefault", default)]
    is_default: bool,
}

/// Default subscription recorded in an `azureProfile.json` document
fn default_subscription_from_profile(content: &str) -> Option<String> {
    // The CLI writes the profile with a byte order mark
    let content = content.trim_start_matches('\u{feff}');
    let profile: AzureProfile = serde_json::from_str(content).ok()?;
    let id = profile
        .subscriptions
        .into_iter()
        .find(|s| s.is_default)?
        .id;
    if validate_subscription_id(&id) {
        Some(id)
    } else {
        tracing::warn!("Invalid subscription id in Azure CLI profile");
        None
    }
}

fn read_profile(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    default_subscription_from_profile(&content)
}

/// Read the default subscription from the environment or the Azure CLI profile
pub fn get_default_subscription() -> Option<String> {
    if let Ok(id) = std::env::var("AZURE_SUBSCRIPTION_ID") {
        if validate_subscription_id(&id) {
            return Some(id);
        }
        tracing::warn!("Invalid subscription id format in AZURE_SUBSCRIPTION_ID");
    }

    let config_dir = get_azure_config_dir()?;
    read_profile(&config_dir.join("azureProfile.json"))
}
