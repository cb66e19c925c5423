//! HTTP client for the textonly JSON API, used by `toctl`.

use std::path::{Path, PathBuf};

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::{BlogPost, NewBlogPost, Social, User};
use crate::error::ErrorMessage;
use crate::routes::health::HealthCheckMessage;
use crate::routes::{Envelope, MutationResponse};

pub const USER_AGENT: &str = "toctl (Textonly API client)";

/// Environment variable overriding the configured host.
pub const HOST_ENV: &str = "TEXTONLY_HOST";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no host configured; set `host` in the config file or TEXTONLY_HOST")]
    MissingHost,

    #[error("credentials are required for this command; set `user` and `password` in the config file")]
    MissingCredentials,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// Contents of `toctl.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl ClientConfig {
    /// `<config dir>/textonly/toctl.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("textonly").join("toctl.toml"))
    }

    /// Read `path`. A missing file at the default location is an empty config.
    pub fn load(path: &Path, required: bool) -> Result<Self, ClientError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ClientError::ParseConfig {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file");
                Ok(Self::default())
            }
            Err(source) => Err(ClientError::ReadConfig {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply a host given on the command line or in the environment.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
    user: String,
    password: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = config.host.trim().trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(ClientError::MissingHost);
        }

        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base,
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        if self.user.is_empty() || self.password.is_empty() {
            return Err(ClientError::MissingCredentials);
        }
        Ok(request.basic_auth(&self.user, Some(&self.password)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.header(header::ACCEPT, "application/json").send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        self.send(self.http.get(url)).await
    }

    pub async fn health(&self) -> Result<HealthCheckMessage, ClientError> {
        self.get("/v1/healthcheck").await
    }

    pub async fn posts(&self) -> Result<Envelope<Vec<BlogPost>>, ClientError> {
        self.get("/api/post").await
    }

    pub async fn post(&self, id: i64) -> Result<Envelope<BlogPost>, ClientError> {
        self.get(&format!("/api/post/{id}")).await
    }

    pub async fn socials(&self) -> Result<Envelope<Vec<Social>>, ClientError> {
        self.get("/api/social").await
    }

    pub async fn social(&self, id: i64) -> Result<Envelope<Social>, ClientError> {
        self.get(&format!("/api/social/{id}")).await
    }

    pub async fn user(&self, id: i64) -> Result<Envelope<User>, ClientError> {
        self.get(&format!("/api/user/{id}")).await
    }

    pub async fn create_post(&self, post: &NewBlogPost) -> Result<Envelope<BlogPost>, ClientError> {
        let request = self.authorized(self.http.post(self.url("/api/post")).json(post))?;
        self.send(request).await
    }

    pub async fn delete_post(&self, id: i64) -> Result<MutationResponse, ClientError> {
        let request = self.authorized(self.http.delete(self.url(&format!("/api/post/{id}"))))?;
        self.send(request).await
    }
}

/// Turn a non-success response into [`ClientError::Status`], keeping the
/// server's message when the body carries one.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorMessage>(&text) {
        Ok(ErrorMessage {
            message: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorMessage { message }) => message.to_string(),
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };

    Err(ClientError::Status { status, message })
}
