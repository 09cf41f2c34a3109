//! `ProjectBackend` over the JSON HTTP API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::backend::ProjectBackend;
use super::error::ClientError;
use crate::database::models::{NewProject, Project, ProjectPatch, UserInfo};
use crate::filter::{AdminStats, ProjectFilter, ProjectStats};
use crate::services::{LoginRequest, RegisterRequest, SessionInfo};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Both envelopes share these keys
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    field_errors: Option<HashMap<String, String>>,
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        // A trailing slash keeps `join` from dropping the last path segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Ok(Self {
            client,
            base_url: Url::parse(&normalized)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        let builder = self.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let data = Self::unwrap_envelope(response).await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn unwrap_envelope(response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        let envelope: Option<Envelope> = serde_json::from_str(&text).ok();

        if status.is_success() {
            return envelope
                .and_then(|e| e.data)
                .ok_or_else(|| ClientError::Decode(format!("missing data in {} response", status)));
        }

        let (message, field) = match envelope {
            Some(envelope) => {
                let field = envelope.field_errors.and_then(|f| f.into_keys().next());
                let message = envelope.error.unwrap_or_else(|| status.to_string());
                (message, field)
            }
            None if text.trim().is_empty() => (status.to_string(), None),
            None => (text, None),
        };
        tracing::debug!(%status, "Request failed: {}", message);
        Err(ClientError::from_status(status.as_u16(), message, field))
    }

    fn project_path(id: Uuid) -> String {
        format!("api/projects/{}", id)
    }
}

#[async_trait]
impl ProjectBackend for HttpBackend {
    async fn register(&self, request: RegisterRequest) -> Result<SessionInfo, ClientError> {
        self.send(self.request(Method::POST, "auth/register", None)?.json(&request))
            .await
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ClientError> {
        self.send(self.request(Method::POST, "auth/login", None)?.json(&request))
            .await
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let _: Value = self
            .send(self.request(Method::DELETE, "api/auth/session", Some(token))?)
            .await?;
        Ok(())
    }

    async fn whoami(&self, token: &str) -> Result<UserInfo, ClientError> {
        self.send(self.request(Method::GET, "api/auth/whoami", Some(token))?)
            .await
    }

    async fn list_projects(&self, token: &str, filter: &ProjectFilter) -> Result<Vec<Project>, ClientError> {
        let builder = self
            .request(Method::GET, "api/projects", Some(token))?
            .query(&filter.to_query_pairs());
        self.send(builder).await
    }

    async fn create_project(&self, token: &str, input: NewProject) -> Result<Project, ClientError> {
        self.send(self.request(Method::POST, "api/projects", Some(token))?.json(&input))
            .await
    }

    async fn update_project(&self, token: &str, id: Uuid, patch: ProjectPatch) -> Result<Project, ClientError> {
        let builder = self
            .request(Method::PATCH, &Self::project_path(id), Some(token))?
            .json(&patch);
        self.send(builder).await
    }

    async fn delete_project(&self, token: &str, id: Uuid) -> Result<(), ClientError> {
        let _: Value = self
            .send(self.request(Method::DELETE, &Self::project_path(id), Some(token))?)
            .await?;
        Ok(())
    }

    async fn project_stats(&self, token: &str) -> Result<ProjectStats, ClientError> {
        self.send(self.request(Method::GET, "api/projects/stats", Some(token))?)
            .await
    }

    async fn admin_stats(&self, token: &str) -> Result<AdminStats, ClientError> {
        self.send(self.request(Method::GET, "api/admin/stats", Some(token))?)
            .await
    }

    async fn admin_users(&self, token: &str) -> Result<Vec<UserInfo>, ClientError> {
        self.send(self.request(Method::GET, "api/admin/users", Some(token))?)
            .await
    }
}
