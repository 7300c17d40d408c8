//! HTTP connection to one XDAQ endpoint.
//!
//! Every request runs its own open → send → close cycle: the underlying
//! client keeps no idle connections and asks the peer to close after the
//! response, so nothing is left open between calls.

use std::sync::OnceLock;

use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use thiserror::Error;

use crate::soap;
use crate::xml::XmlError;

/// Communication errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {status}: {body}")]
    Server { status: StatusCode, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] XmlError),

    #[error("Response is missing {0}")]
    MissingField(&'static str),

    #[error("Invalid job ID in response: '{0}'")]
    InvalidJobId(String),

    #[error("Unexpected kill reply: '{0}'")]
    UnexpectedKillReply(String),
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Connection to `http://host:port`, built on first use.
#[derive(Debug)]
pub struct Connection {
    base_url: String,
    client: OnceLock<Client>,
}

impl Connection {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{}:{}", host, port),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client, ClientError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder().pool_max_idle_per_host(0).build()?;
        Ok(self.client.get_or_init(|| client))
    }

    /// POST a SOAP envelope and return the response body.
    pub async fn send_soap(&self, action: &str, envelope: String) -> Result<String, ClientError> {
        tracing::debug!("SOAP {} -> {}", action, self.base_url);

        let response = self
            .client()?
            .post(format!("{}/", self.base_url))
            .header(CONTENT_TYPE, soap::CONTENT_TYPE)
            .header(CONNECTION, "close")
            .header("SOAPAction", action)
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Server { status, body })
        }
    }

    /// Send one request with form-encoded parameters and read the whole response.
    pub async fn request(
        &self,
        method: Method,
        resource: &str,
        parameters: &[(&str, &str)],
    ) -> Result<HttpResponse, ClientError> {
        let url = format!("{}{}", self.base_url, encode_resource(resource));
        tracing::debug!("{} {}", method, url);

        let response = self
            .client()?
            .request(method, &url)
            .header(ACCEPT, "text/plain")
            .header(CONNECTION, "close")
            .form(parameters)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Percent-encode each path segment, keeping the `/` separators.
fn encode_resource(resource: &str) -> String {
    let encoded = resource
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if encoded.starts_with('/') {
        encoded
    } else {
        format!("/{}", encoded)
    }
}
