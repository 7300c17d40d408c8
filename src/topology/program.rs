use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::ClientError;
use crate::config::JobControl;
use crate::error::TopologyError;
use crate::render::{self, ApplicationReport, ContextReport};
use crate::topology::{parse_endpoint, Application, Context};
use crate::xml::Element;

/// Parse a `host:port=jid` job assignment, as printed by the state table.
pub fn parse_job_assignment(value: &str) -> Result<(String, u16, i64), TopologyError> {
    let invalid = || TopologyError::InvalidJobAssignment {
        value: value.to_string(),
    };

    let (endpoint, jid) = value.rsplit_once('=').ok_or_else(invalid)?;
    let (host, port) = parse_endpoint(endpoint.trim())?;
    let jid = jid.trim().parse().map_err(|_| invalid())?;

    Ok((host, port, jid))
}

/// Every context described by one topology file.
#[derive(Debug)]
pub struct Program {
    config_path: PathBuf,
    contexts: Vec<Context>,
}

impl Program {
    /// Load a topology file with default job-control settings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        Self::load(path, JobControl::default())
    }

    /// Load a topology file.
    pub fn load(path: impl AsRef<Path>, job_control: JobControl) -> Result<Self, TopologyError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TopologyError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path, job_control)
    }

    /// Build from topology XML. `config_path` is what executives are started with.
    ///
    /// Children of the root that are not contexts are skipped silently; contexts
    /// that fail to parse are logged and skipped.
    pub fn parse(
        text: &str,
        config_path: impl Into<PathBuf>,
        job_control: JobControl,
    ) -> Result<Self, TopologyError> {
        let config_path = config_path.into();
        let root = Element::parse(text)?;
        let job_control = Arc::new(job_control);

        let mut contexts = Vec::new();
        for node in root.children() {
            match Context::from_element(node, config_path.clone(), Arc::clone(&job_control)) {
                Ok(context) => contexts.push(context),
                Err(TopologyError::NotAContextNode) => {
                    tracing::trace!("Skipping non-Context node {}", node.tag());
                }
                Err(e) => {
                    tracing::warn!("Unable to create context for node {}: {}", node.tag(), e);
                }
            }
        }

        Ok(Self {
            config_path,
            contexts,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Record the job id of the executive at `host:port`, e.g. one started
    /// by an earlier run. Returns `false` when no context has that endpoint.
    pub fn assign_job_id(&mut self, host: &str, port: u16, job_id: i64) -> bool {
        match self
            .contexts
            .iter_mut()
            .find(|context| context.host() == host && context.port() == port)
        {
            Some(context) => {
                context.set_job_id(Some(job_id));
                true
            }
            None => false,
        }
    }

    /// All applications, context by context.
    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.contexts
            .iter()
            .flat_map(|context| context.applications().iter())
    }

    /// Start every context in order. Stops at the first failure.
    pub async fn start_all_processes(&mut self) -> Result<(), ClientError> {
        for context in &mut self.contexts {
            context.start_process().await?;
        }
        Ok(())
    }

    /// Kill every context in order and return how many had a job killed.
    /// Stops at the first failure.
    pub async fn kill_all_processes(&mut self) -> Result<usize, ClientError> {
        let mut killed = 0;
        for context in &mut self.contexts {
            if context.kill_process().await? {
                killed += 1;
            }
        }
        Ok(killed)
    }

    /// Send `command` to every application and collect the raw responses.
    pub async fn send_all_command(&self, command: &str) -> Result<Vec<String>, ClientError> {
        let mut responses = Vec::new();
        for application in self.applications() {
            responses.push(application.send_command(command).await?);
        }
        Ok(responses)
    }

    /// Query every application's state.
    pub async fn states(&self) -> Vec<ContextReport> {
        let mut reports = Vec::with_capacity(self.contexts.len());
        for context in &self.contexts {
            let mut applications = Vec::with_capacity(context.applications().len());
            for application in context.applications() {
                applications.push(ApplicationReport {
                    class_name: application.class_name().to_string(),
                    instance: application.instance(),
                    state: application.state().await,
                });
            }
            reports.push(ContextReport {
                endpoint: format!("{}:{}", context.host(), context.port()),
                job_id: context.job_id(),
                applications,
            });
        }
        reports
    }

    /// Print the state table to stdout.
    pub async fn print_all_states(&self) {
        print!("{}", render::render_states(&self.states().await));
    }

    /// Applications with the given class name and, if supplied, instance.
    pub fn find_all_matching_applications(
        &self,
        class_name: &str,
        instance: Option<u32>,
    ) -> Vec<&Application> {
        self.applications()
            .filter(|application| application.class_name() == class_name)
            .filter(|application| instance.map_or(true, |i| application.instance() == i))
            .collect()
    }

    /// Send `command` to the matching applications and collect the raw responses.
    pub async fn send_all_matching_applications_command(
        &self,
        command: &str,
        class_name: &str,
        instance: Option<u32>,
    ) -> Result<Vec<String>, ClientError> {
        let mut responses = Vec::new();
        for application in self.find_all_matching_applications(class_name, instance) {
            responses.push(application.send_command(command).await?);
        }
        Ok(responses)
    }
}
