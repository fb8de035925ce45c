//! HTTP implementation of the container API
//!
//! Thin wrapper over the Tag Manager v1 REST surface. Requests carry a
//! bearer token; list responses arrive wrapped (`{"tags": [...]}`) and a
//! missing key means an empty container, not an error.

use crate::api::ContainerApi;
use crate::entities::{Container, Tag, Trigger, Variable};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default v1 API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/tagmanager/v1";

/// Connection settings for [`TagManagerService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API endpoint, without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize, Default)]
struct ContainerListResponse {
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Deserialize, Default)]
struct TagListResponse {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Deserialize, Default)]
struct TriggerListResponse {
    #[serde(default)]
    triggers: Vec<Trigger>,
}

#[derive(Deserialize, Default)]
struct VariableListResponse {
    #[serde(default)]
    variables: Vec<Variable>,
}

/// HTTP client for one authenticated session against the remote service.
pub struct TagManagerService {
    http: reqwest::Client,
    config: ServiceConfig,
    access_token: String,
}

impl TagManagerService {
    /// Build a service from connection settings and a bearer access token.
    pub fn new(config: ServiceConfig, access_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            access_token: access_token.into(),
        })
    }

    fn account_url(&self, account_id: &str, path: &str) -> String {
        format!("{}/accounts/{account_id}/{path}", self.config.base_url)
    }

    fn container_url(&self, account_id: &str, container_id: &str, path: &str) -> String {
        self.account_url(account_id, &format!("containers/{container_id}/{path}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, operation: &str) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = Self::check(response, operation).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl serde::Serialize,
        operation: &str,
    ) -> Result<T> {
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        let response = Self::check(response, operation).await?;
        Ok(response.json().await?)
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl serde::Serialize,
        operation: &str,
    ) -> Result<T> {
        debug!("PUT {url}");
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        let response = Self::check(response, operation).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, url: &str, operation: &str) -> Result<()> {
        debug!("DELETE {url}");
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check(response, operation).await?;
        Ok(())
    }

    // Map HTTP status failures into the library taxonomy: credential
    // rejections become Auth, everything else an Api error carrying the
    // status line and response body.
    async fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::auth(format!("{operation}: HTTP {status}: {body}")));
        }
        Err(Error::api(operation, format!("HTTP {status}: {body}")))
    }
}

#[async_trait]
impl ContainerApi for TagManagerService {
    async fn find_container_id(
        &self,
        account_id: &str,
        container_name: &str,
    ) -> Result<Option<String>> {
        let url = self.account_url(account_id, "containers");
        let listed: ContainerListResponse = self.get_json(&url, "list containers").await?;
        Ok(listed
            .containers
            .into_iter()
            .find(|c| c.name == container_name)
            .map(|c| c.container_id))
    }

    async fn list_tags(&self, account_id: &str, container_id: &str) -> Result<Vec<Tag>> {
        let url = self.container_url(account_id, container_id, "tags");
        let listed: TagListResponse = self.get_json(&url, "list tags").await?;
        Ok(listed.tags)
    }

    async fn list_triggers(&self, account_id: &str, container_id: &str) -> Result<Vec<Trigger>> {
        let url = self.container_url(account_id, container_id, "triggers");
        let listed: TriggerListResponse = self.get_json(&url, "list triggers").await?;
        Ok(listed.triggers)
    }

    async fn list_variables(&self, account_id: &str, container_id: &str) -> Result<Vec<Variable>> {
        let url = self.container_url(account_id, container_id, "variables");
        let listed: VariableListResponse = self.get_json(&url, "list variables").await?;
        Ok(listed.variables)
    }

    async fn create_tag(&self, account_id: &str, container_id: &str, tag: &Tag) -> Result<Tag> {
        let url = self.container_url(account_id, container_id, "tags");
        self.post_json(&url, tag, "create tag").await
    }

    async fn update_tag(&self, account_id: &str, container_id: &str, tag: &Tag) -> Result<Tag> {
        let url = self.container_url(account_id, container_id, &format!("tags/{}", tag.tag_id));
        self.put_json(&url, tag, "update tag").await
    }

    async fn delete_tag(&self, account_id: &str, container_id: &str, tag_id: &str) -> Result<()> {
        let url = self.container_url(account_id, container_id, &format!("tags/{tag_id}"));
        self.delete(&url, "delete tag").await
    }

    async fn create_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger: &Trigger,
    ) -> Result<Trigger> {
        let url = self.container_url(account_id, container_id, "triggers");
        self.post_json(&url, trigger, "create trigger").await
    }

    async fn delete_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
    ) -> Result<()> {
        let url = self.container_url(account_id, container_id, &format!("triggers/{trigger_id}"));
        self.delete(&url, "delete trigger").await
    }

    async fn create_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable: &Variable,
    ) -> Result<Variable> {
        let url = self.container_url(account_id, container_id, "variables");
        self.post_json(&url, variable, "create variable").await
    }

    async fn delete_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
    ) -> Result<()> {
        let url = self.container_url(account_id, container_id, &format!("variables/{variable_id}"));
        self.delete(&url, "delete variable").await
    }
}
