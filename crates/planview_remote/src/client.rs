use std::time::Duration;

use planview_logging::{pv_debug, pv_info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    CopyTextPayload, DescendantsPayload, DiagramPayload, RejectionPayload, RemoteError,
};

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Processing runs the scheduler server-side and can take a while.
    pub request_timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// The server calls the viewer depends on.
#[async_trait::async_trait]
pub trait PlanService: Send + Sync {
    /// POST `/process` with the pasted text.
    async fn process(&self, content: &str) -> Result<DiagramPayload, RemoteError>;
    /// POST `/clear-last-selected`, no body.
    async fn clear_selection(&self) -> Result<DiagramPayload, RemoteError>;
    /// POST `/get-descendants`; returns the tokens as text.
    async fn descendants(&self, node: &str) -> Result<Vec<String>, RemoteError>;
    /// GET `/get-copy-text`.
    async fn copy_text(&self) -> Result<String, RemoteError>;
}

#[derive(Serialize)]
struct ProcessRequest<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct DescendantsRequest<'a> {
    node: &'a str,
}

/// HTTP implementation. One client is shared by every call so the session
/// cookie the server keys its state on is sent back each time.
#[derive(Debug, Clone)]
pub struct ReqwestPlanService {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestPlanService {
    pub fn new(settings: RemoteSettings) -> Result<Self, RemoteError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|err| RemoteError::InvalidUrl(err.to_string()))
    }
}

#[async_trait::async_trait]
impl PlanService for ReqwestPlanService {
    async fn process(&self, content: &str) -> Result<DiagramPayload, RemoteError> {
        let url = self.endpoint("process")?;
        pv_info!("POST {} ({} bytes)", url, content.len());
        let response = self
            .client
            .post(url)
            .json(&ProcessRequest { content })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn clear_selection(&self) -> Result<DiagramPayload, RemoteError> {
        let url = self.endpoint("clear-last-selected")?;
        pv_info!("POST {}", url);
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn descendants(&self, node: &str) -> Result<Vec<String>, RemoteError> {
        let url = self.endpoint("get-descendants")?;
        pv_debug!("POST {} node={}", url, node);
        let response = self
            .client
            .post(url)
            .json(&DescendantsRequest { node })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let payload: DescendantsPayload = read_json(response).await?;
        Ok(payload
            .descendants
            .into_iter()
            .map(|token| token.to_string())
            .collect())
    }

    async fn copy_text(&self) -> Result<String, RemoteError> {
        let url = self.endpoint("get-copy-text")?;
        pv_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let payload: CopyTextPayload = read_json(response).await?;
        Ok(payload.text)
    }
}

/// Decodes a JSON body. Non-2xx statuses become `Rejected`, keeping whatever
/// message and notifications the error body carries.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let payload = serde_json::from_slice::<RejectionPayload>(&body).unwrap_or_else(|err| {
            pv_debug!("Unstructured error body for status {}: {}", status, err);
            RejectionPayload::default()
        });
        return Err(RemoteError::Rejected {
            status: status.as_u16(),
            payload,
        });
    }

    serde_json::from_slice(&body).map_err(|err| RemoteError::MalformedBody(err.to_string()))
}

fn parse_base_url(raw: &str) -> Result<Url, RemoteError> {
    let mut base = Url::parse(raw).map_err(|err| RemoteError::InvalidUrl(err.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return RemoteError::MalformedBody(err.to_string());
    }
    RemoteError::Network(err.to_string())
}
