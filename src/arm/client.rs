//! ARM Client
//!
//! Main client for the management endpoint, combining authentication, HTTP,
//! and URL building. Implements [`Transport`] for the resource layer.

use super::auth::ArmCredentials;
use super::http::ArmHttpClient;
use crate::resource::{Page, ResourceDef, Transport};
use anyhow::{bail, Context, Result};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use url::Url;

/// Public cloud management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Main ARM client, scoped to one subscription
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: ArmCredentials,
    pub http: ArmHttpClient,
    pub subscription_id: String,
    endpoint: Url,
}

impl ArmClient {
    /// Create a new ARM client
    pub fn new(subscription_id: &str, endpoint: &str, credentials: ArmCredentials) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid management endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            bail!("Invalid management endpoint: {}", endpoint);
        }

        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            subscription_id: subscription_id.to_string(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request against an absolute URL
    pub async fn get_url(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{type}`
    pub fn collection_path(&self, def: &ResourceDef, resource_group: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            self.endpoint(),
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            def.provider,
            def.resource_type
        )
    }

    /// URL listing every resource of a kind in a resource group
    pub fn collection_url(&self, def: &ResourceDef, resource_group: &str) -> String {
        format!(
            "{}?api-version={}",
            self.collection_path(def, resource_group),
            def.api_version
        )
    }

    /// URL of a single resource
    pub fn resource_url(&self, def: &ResourceDef, resource_group: &str, name: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.collection_path(def, resource_group),
            urlencoding::encode(name),
            def.api_version
        )
    }

    /// Only follow continuation links pointing back at the configured endpoint
    fn check_next_link(&self, link: &str) -> Result<()> {
        let url = Url::parse(link).context("Invalid nextLink in list response")?;
        if url.origin() != self.endpoint.origin() {
            bail!("nextLink points outside the management endpoint");
        }
        Ok(())
    }
}

impl Transport for ArmClient {
    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn get<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            let url = self.resource_url(def, resource_group, name);
            self.get_url(&url).await
        }
        .boxed()
    }

    fn put<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            let url = self.resource_url(def, resource_group, name);
            let token = self.get_token().await?;
            self.http.put(&url, &token, &body).await
        }
        .boxed()
    }

    fn delete<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let url = self.resource_url(def, resource_group, name);
            let token = self.get_token().await?;
            self.http.delete(&url, &token).await?;
            Ok(())
        }
        .boxed()
    }

    fn list_page<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        next_link: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page>> {
        async move {
            let url = match next_link {
                Some(link) => {
                    self.check_next_link(link)?;
                    link.to_string()
                }
                None => self.collection_url(def, resource_group),
            };
            let response = self.get_url(&url).await?;
            Ok(Page::from_response(&response))
        }
        .boxed()
    }
}
