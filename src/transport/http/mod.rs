use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::{ConfigError, ProviderError};
use crate::core::types::{AdapterContext, ProviderId};

pub(crate) const AUTH_BEARER_TOKEN_KEY: &str = "transport.auth.bearer_token";
pub(crate) const CUSTOM_HEADER_PREFIX: &str = "transport.header.";
const REQUEST_ID_HEADER_KEY: &str = "transport.request_id_header";
const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Outbound request body.
enum RequestBody<'a> {
    Json(Vec<u8>),
    Form(&'a [(&'a str, String)]),
}

/// One POST per call: a failed request is reported, never repeated.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), timeout_ms)
    }

    pub fn with_client(client: reqwest::Client, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }

        Ok(Self { client, timeout_ms })
    }

    pub async fn post_json<TReq, TResp>(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        url: &str,
        body: &TReq,
        ctx: &AdapterContext,
    ) -> Result<TResp, ProviderError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|error| ProviderError::Serialization {
            provider,
            model: model.map(str::to_string),
            request_id: None,
            message: error.to_string(),
        })?;

        self.send(provider, model, url, RequestBody::Json(payload), ctx)
            .await
    }

    /// Sends `application/x-www-form-urlencoded` fields and decodes a JSON response.
    pub async fn post_form<TResp>(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        url: &str,
        fields: &[(&str, String)],
        ctx: &AdapterContext,
    ) -> Result<TResp, ProviderError>
    where
        TResp: DeserializeOwned,
    {
        self.send(provider, model, url, RequestBody::Form(fields), ctx)
            .await
    }

    async fn send<TResp>(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        url: &str,
        body: RequestBody<'_>,
        ctx: &AdapterContext,
    ) -> Result<TResp, ProviderError>
    where
        TResp: DeserializeOwned,
    {
        let header_config = self.build_header_config(provider, model, ctx)?;
        debug!(%provider, model = ?model, url, "sending provider request");

        let request_builder = self
            .client
            .request(Method::POST, url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .headers(header_config.headers);

        let request_builder = match body {
            RequestBody::Json(payload) => request_builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload),
            RequestBody::Form(fields) => request_builder.form(fields),
        };

        let response = request_builder
            .send()
            .await
            .map_err(|error| ProviderError::Transport {
                provider,
                model: model.map(str::to_string),
                message: error.to_string(),
            })?;

        let request_id = extract_request_id(response.headers(), &header_config.request_id_header);
        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            return Err(build_status_error(provider, model, status_code, request_id, response).await);
        }

        response
            .json::<TResp>()
            .await
            .map_err(|error| ProviderError::Serialization {
                provider,
                model: model.map(str::to_string),
                request_id,
                message: error.to_string(),
            })
    }

    fn build_header_config(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        ctx: &AdapterContext,
    ) -> Result<HeaderConfig, ProviderError> {
        let request_id_header = match ctx.metadata.get(REQUEST_ID_HEADER_KEY) {
            Some(value) => parse_header_name(value, provider, model)?,
            None => HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER),
        };

        let mut headers = HeaderMap::new();
        if let Some(token) = ctx.metadata.get(AUTH_BEARER_TOKEN_KEY) {
            let auth_value =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|error| {
                    protocol_error(
                        provider,
                        model,
                        format!("invalid bearer token header value: {error}"),
                    )
                })?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        for (key, value) in &ctx.metadata {
            if let Some(raw_name) = key.strip_prefix(CUSTOM_HEADER_PREFIX) {
                let header_name = parse_header_name(raw_name, provider, model)?;
                let mut header_value = HeaderValue::from_str(value).map_err(|error| {
                    protocol_error(
                        provider,
                        model,
                        format!("invalid header value for {raw_name}: {error}"),
                    )
                })?;
                header_value.set_sensitive(true);
                headers.insert(header_name, header_value);
            }
        }

        Ok(HeaderConfig {
            headers,
            request_id_header,
        })
    }
}

struct HeaderConfig {
    headers: HeaderMap,
    request_id_header: HeaderName,
}

async fn build_status_error(
    provider: ProviderId,
    model: Option<&str>,
    status_code: u16,
    request_id: Option<String>,
    response: Response,
) -> ProviderError {
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => format!("http status {status_code}"),
        Err(error) => format!("http status {status_code}; failed to read response body: {error}"),
    };

    ProviderError::Status {
        provider,
        model: model.map(str::to_string),
        status_code,
        request_id,
        message,
    }
}

fn protocol_error(provider: ProviderId, model: Option<&str>, message: String) -> ProviderError {
    ProviderError::Protocol {
        provider,
        model: model.map(str::to_string),
        request_id: None,
        message,
    }
}

fn parse_header_name(
    value: &str,
    provider: ProviderId,
    model: Option<&str>,
) -> Result<HeaderName, ProviderError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|error| {
        protocol_error(provider, model, format!("invalid header name: {value}: {error}"))
    })
}

fn extract_request_id(headers: &HeaderMap, request_id_header: &HeaderName) -> Option<String> {
    headers
        .get(request_id_header)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
