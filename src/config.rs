//! Job-control settings used when starting and killing XDAQ executives.
//!
//! Configuration is via environment variables:
//! - `XDAQ_JOBCONTROL_LID` - Local id of the jobcontrol application (default: `10`)
//! - `XDAQ_EXEC_PATH` - Executable to launch (default: `/opt/xdaq/bin/xdaq.exe`)
//! - `XDAQ_USER` - Account the executive runs as (falls back to `USER`)
//! - `XDAQ_ROOT`, `XDAQ_DOCUMENT_ROOT`, `LD_LIBRARY_PATH` - forwarded to the executive when set

/// Default jobcontrol local id.
const DEFAULT_LID: u32 = 10;

/// Default executive binary.
const DEFAULT_EXEC_PATH: &str = "/opt/xdaq/bin/xdaq.exe";

/// Default account when neither `XDAQ_USER` nor `USER` is set.
const DEFAULT_USER: &str = "xdaq";

/// Variables copied from our environment into the started executive's.
const FORWARDED_VARIABLES: [&str; 3] = ["XDAQ_ROOT", "XDAQ_DOCUMENT_ROOT", "LD_LIBRARY_PATH"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobControl {
    pub lid: u32,
    pub exec_path: String,
    pub user: String,
    /// Environment for the started executive, in the order it is sent.
    pub environment: Vec<(String, String)>,
}

impl Default for JobControl {
    fn default() -> Self {
        Self {
            lid: DEFAULT_LID,
            exec_path: DEFAULT_EXEC_PATH.to_string(),
            user: DEFAULT_USER.to_string(),
            environment: Vec::new(),
        }
    }
}

impl JobControl {
    /// Build settings from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lid = match lookup("XDAQ_JOBCONTROL_LID") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring invalid XDAQ_JOBCONTROL_LID '{}', using {}",
                    raw,
                    DEFAULT_LID
                );
                DEFAULT_LID
            }),
            None => DEFAULT_LID,
        };

        let exec_path = lookup("XDAQ_EXEC_PATH").unwrap_or_else(|| DEFAULT_EXEC_PATH.to_string());
        let user = lookup("XDAQ_USER")
            .or_else(|| lookup("USER"))
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let environment = FORWARDED_VARIABLES
            .iter()
            .filter_map(|&name| lookup(name).map(|value| (name.to_string(), value)))
            .collect();

        Self {
            lid,
            exec_path,
            user,
            environment,
        }
    }

    /// SOAPAction addressing the jobcontrol application.
    pub fn soap_action(&self) -> String {
        format!("urn:xdaq-application:lid={}", self.lid)
    }
}
