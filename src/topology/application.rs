use std::fmt;

use reqwest::Method;
use serde::{Serialize, Serializer};

use crate::client::{ClientError, Connection, HttpResponse};
use crate::soap;
use crate::xml::Element;

/// Result of asking an application for its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// The `stateName` the application reported.
    Known(String),
    /// Reached the application, but the reply had no `stateName`.
    Unknown,
    /// The request failed or the reply was not XML.
    Uncontactable,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => f.write_str(name),
            Self::Unknown => f.write_str("<unknown>"),
            Self::Uncontactable => f.write_str("<uncontactable>"),
        }
    }
}

impl Serialize for AppState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One XDAQ application, addressed by class name and instance inside its
/// context's executive.
#[derive(Debug)]
pub struct Application {
    host: String,
    port: u16,
    class_name: String,
    instance: u32,
    job_id: Option<i64>,
    connection: Connection,
}

impl Application {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        class_name: impl Into<String>,
        instance: u32,
    ) -> Self {
        let host = host.into();
        let connection = Connection::new(&host, port);
        Self {
            host,
            port,
            class_name: class_name.into(),
            instance,
            job_id: None,
            connection,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    /// Job id of the executive hosting this application, if it was started by us.
    pub fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    pub(crate) fn set_job_id(&mut self, job_id: Option<i64>) {
        self.job_id = job_id;
    }

    /// Send a SOAP command and return the raw response body.
    pub async fn send_command(&self, command: &str) -> Result<String, ClientError> {
        self.connection
            .send_soap(
                &soap::application_action(&self.class_name, self.instance),
                soap::command(command),
            )
            .await
    }

    /// Query the application's current state via `ParameterQuery`.
    pub async fn state(&self) -> AppState {
        let response = match self.send_command("ParameterQuery").await {
            Ok(body) => body,
            // A fault still came from the process; its body decides the state.
            Err(ClientError::Server { status, body }) => {
                tracing::debug!("{} answered the state query with {}", self, status);
                body
            }
            Err(e) => {
                tracing::debug!("{} is uncontactable: {}", self, e);
                return AppState::Uncontactable;
            }
        };

        let document = match Element::parse(&response) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("{} sent an unreadable state reply: {}", self, e);
                return AppState::Uncontactable;
            }
        };

        document
            .path(&["Body", "ParameterQueryResponse", "properties", "stateName"])
            .and_then(Element::text)
            .map_or(AppState::Unknown, |name| AppState::Known(name.to_string()))
    }

    /// Issue a plain HTTP request against the application's endpoint.
    ///
    /// `parameters` are sent URL-form-encoded in the request body.
    pub async fn http_request(
        &self,
        method: Method,
        resource: &str,
        parameters: &[(&str, &str)],
    ) -> Result<HttpResponse, ClientError> {
        self.connection.request(method, resource, parameters).await
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<XDAQ Application {}, {}, {}, {}>",
            self.host, self.port, self.class_name, self.instance
        )
    }
}
