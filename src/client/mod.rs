//! Typed HTTP client for the employee routes.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::model::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::models::AccessResponse;

mod error;

pub use error::{ClientError, ClientResult};

const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Employee operations as seen by the roster view.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn list_all(&self) -> ClientResult<Vec<Employee>>;
    async fn list_by_department(&self, department: &str) -> ClientResult<Vec<Employee>>;
    async fn create(&self, employee: &CreateEmployee) -> ClientResult<Employee>;
    async fn update(&self, id: u64, changes: &UpdateEmployee) -> ClientResult<Employee>;
    async fn delete(&self, id: u64) -> ClientResult<()>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    /// e.g. `http://localhost:5000/api`
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Exchanges the access passcode for a bearer token and keeps it for
    /// later calls.
    pub async fn unlock(&mut self, passcode: &str) -> ClientResult<AccessResponse> {
        let response = self
            .client
            .post(self.url("access"))
            .json(&json!({ "passcode": passcode }))
            .send()
            .await?;
        let access: AccessResponse = handle_response(response).await?;
        self.token = Some(access.access_token.clone());
        Ok(access)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

/// Non-success statuses become [`ClientError::Api`] carrying the body's
/// `error` message and the decoded body itself.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(response.json().await?)
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let payload = match response.text().await {
        Ok(text) => serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({})),
        Err(_) => json!({}),
    };
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string();

    debug!(%status, %message, "Request failed");

    ClientError::Api {
        status,
        message,
        payload,
    }
}

#[async_trait]
impl EmployeeApi for ApiClient {
    async fn list_all(&self) -> ClientResult<Vec<Employee>> {
        let req = self.authorized(self.client.get(self.url("employees")));
        handle_response(req.send().await?).await
    }

    async fn list_by_department(&self, department: &str) -> ClientResult<Vec<Employee>> {
        let mut url = reqwest::Url::parse(&self.url("employees/department"))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        // push_segment percent-encodes the tag
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(department);
        }
        let req = self.authorized(self.client.get(url));
        handle_response(req.send().await?).await
    }

    async fn create(&self, employee: &CreateEmployee) -> ClientResult<Employee> {
        let req = self.authorized(self.client.post(self.url("employees")).json(employee));
        handle_response(req.send().await?).await
    }

    async fn update(&self, id: u64, changes: &UpdateEmployee) -> ClientResult<Employee> {
        let req = self.authorized(
            self.client
                .put(self.url(&format!("employees/{}", id)))
                .json(changes),
        );
        handle_response(req.send().await?).await
    }

    async fn delete(&self, id: u64) -> ClientResult<()> {
        let req = self.authorized(self.client.delete(self.url(&format!("employees/{}", id))));
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            // 204 carries no body; any other 2xx body is ignored
            return Ok(());
        }
        Err(api_error(status, response).await)
    }
}
