use std::fmt::Display;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use crate::app_error::{AppError, AppResult, ErrorBody};
use crate::models::{CreatedFilter, FilterPayload};

const FILTER_PATH: &str = "/rest/api/3/filter";

/// Creates saved filters in the remote tracker. One call, one request.
pub trait FilterApi {
    fn create_filter(&self, payload: &FilterPayload) -> AppResult<CreatedFilter>;
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
}

pub struct JiraClient {
    base_url: String,
    client: Client,
}

impl JiraClient {
    pub fn new(base_url: &str, auth_header: &str, timeouts: Timeouts) -> AppResult<Self> {
        let normalized_base_url = base_url.trim();
        if normalized_base_url.is_empty() {
            return Err(AppError::Config("Jira base URL is required".to_string()));
        }
        let parsed = Url::parse(normalized_base_url).map_err(|e| {
            AppError::Config(format!("invalid Jira base URL '{normalized_base_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Jira base URL must use http or https, got '{normalized_base_url}'"
            )));
        }

        let mut auth = HeaderValue::from_str(auth_header)
            .map_err(|e| AppError::Config(format!("invalid authorization header: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: normalized_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn filter_url(&self) -> String {
        format!("{}{}", self.base_url, FILTER_PATH)
    }
}

impl FilterApi for JiraClient {
    fn create_filter(&self, payload: &FilterPayload) -> AppResult<CreatedFilter> {
        let url = self.filter_url();
        log::debug!("POST {url} name={:?}", payload.name);

        let response = self.client.post(&url).json(payload).send()?;
        read_created(response)
    }
}

fn read_created(response: Response) -> AppResult<CreatedFilter> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Http {
            status: status.as_u16(),
            body: error_body(response.text()),
        });
    }

    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| {
        AppError::Unexpected(format!("unreadable create-filter response ({e}): {text}"))
    })
}

fn error_body<E: Display>(read: Result<String, E>) -> ErrorBody {
    match read {
        Ok(text) => ErrorBody::from_text(text),
        Err(e) => ErrorBody::Text(format!("<failed to read response body: {e}>")),
    }
}
