use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::{ClientError, Connection};
use crate::config::JobControl;
use crate::error::TopologyError;
use crate::soap;
use crate::topology::Application;
use crate::xml::Element;

/// Reply from jobcontrol when there was nothing to kill.
const NO_JOB_KILLED: &str = "no job killed.";

/// Reply from jobcontrol after a successful kill.
const KILLED_BY_JID: &str = "killed by JID";

/// Split a context url into host and port.
///
/// The host is whatever sits between the last two `:` separators (after its
/// final `/`), the port whatever follows the last `:`. This only works for urls
/// shaped exactly like `scheme://host:port`; a trailing path makes the port
/// unparseable and is reported as such.
pub fn parse_endpoint(url: &str) -> Result<(String, u16), TopologyError> {
    let malformed = |reason: &'static str| TopologyError::MalformedUrl {
        url: url.to_string(),
        reason,
    };

    let mut parts = url.rsplitn(3, ':');
    let port = parts.next().unwrap_or_default();
    let authority = parts.next().ok_or_else(|| malformed("no port separator"))?;

    let host = authority.rsplit('/').next().unwrap_or(authority);
    if host.is_empty() {
        return Err(malformed("empty host"));
    }
    let port = port.parse().map_err(|_| malformed("invalid port"))?;

    Ok((host.to_string(), port))
}

/// An XDAQ executive (one `host:port`) and the applications it hosts.
#[derive(Debug)]
pub struct Context {
    host: String,
    port: u16,
    config_path: PathBuf,
    job_id: Option<i64>,
    applications: Vec<Application>,
    job_control: Arc<JobControl>,
    connection: Connection,
}

impl Context {
    /// Build a context from a `<Context url="...">` element and its
    /// `<Application class="..." instance="..."/>` children.
    pub fn from_element(
        element: &Element,
        config_path: impl Into<PathBuf>,
        job_control: Arc<JobControl>,
    ) -> Result<Self, TopologyError> {
        if element.local_name() != "Context" {
            return Err(TopologyError::NotAContextNode);
        }

        let url = element.attribute("url").ok_or(TopologyError::MissingUrl)?;
        let (host, port) = parse_endpoint(url)?;

        let applications = element
            .children_named("Application")
            .into_iter()
            .map(|child| -> Result<Application, TopologyError> {
                let class_name = child
                    .attribute("class")
                    .ok_or(TopologyError::MissingAttribute { attribute: "class" })?;
                let instance = child
                    .attribute("instance")
                    .ok_or(TopologyError::MissingAttribute {
                        attribute: "instance",
                    })?;
                let instance = instance
                    .trim()
                    .parse()
                    .map_err(|_| TopologyError::InvalidInstance {
                        value: instance.to_string(),
                    })?;
                Ok(Application::new(host.as_str(), port, class_name, instance))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let connection = Connection::new(&host, port);
        Ok(Self {
            host,
            port,
            config_path: config_path.into(),
            job_id: None,
            applications,
            job_control,
            connection,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Job id assigned by jobcontrol, `None` when not started.
    pub fn job_id(&self) -> Option<i64> {
        self.job_id
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Set the job id, e.g. for an executive started by an earlier run.
    /// Applications in the context follow it.
    pub fn set_job_id(&mut self, job_id: Option<i64>) {
        self.job_id = job_id;
        for application in &mut self.applications {
            application.set_job_id(job_id);
        }
    }

    /// Launch this context's executive through jobcontrol and record its job id.
    pub async fn start_process(&mut self) -> Result<i64, ClientError> {
        self.set_job_id(None);

        let response = self
            .connection
            .send_soap(
                &self.job_control.soap_action(),
                soap::start_executive(&self.job_control, self.port, &self.config_path),
            )
            .await?;
        let document = Element::parse(&response)?;

        let jid = document
            .path(&["Body", "jidResponse", "jid"])
            .and_then(Element::text)
            .ok_or(ClientError::MissingField("Body/jidResponse/jid"))?;
        let jid = jid
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidJobId(jid.to_string()))?;

        self.set_job_id(Some(jid));
        tracing::info!("Started {}:{} with job ID {}", self.host, self.port, jid);
        Ok(jid)
    }

    /// Kill the executive started under the current job id.
    ///
    /// Returns `false` when jobcontrol had nothing to kill. Any reply other than
    /// the two known ones is an error and leaves the job id untouched.
    pub async fn kill_process(&mut self) -> Result<bool, ClientError> {
        let response = self
            .connection
            .send_soap(
                &self.job_control.soap_action(),
                soap::kill_executive(&self.job_control, self.job_id.unwrap_or(-1)),
            )
            .await?;
        let document = Element::parse(&response)?;

        let reply = document
            .path(&["Body", "getStateResponse", "reply"])
            .and_then(Element::text)
            .ok_or(ClientError::MissingField("Body/getStateResponse/reply"))?;

        match reply {
            NO_JOB_KILLED => {
                tracing::info!("No job to kill on {}:{}", self.host, self.port);
                Ok(false)
            }
            KILLED_BY_JID => {
                tracing::info!("Killed job on {}:{}", self.host, self.port);
                self.set_job_id(None);
                Ok(true)
            }
            other => Err(ClientError::UnexpectedKillReply(other.to_string())),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<XDAQ Context {}, {}, {}>",
            self.host,
            self.port,
            self.job_id.unwrap_or(-1)
        )
    }
}
