use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

/// Errors raised while building the topology from XML.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The element is something other than a `Context`. Expected for sibling
    /// nodes in a topology file and skipped quietly.
    #[error("not a Context node")]
    NotAContextNode,

    #[error("context has no `url` attribute")]
    MissingUrl,

    #[error("malformed context url '{url}': {reason}")]
    MalformedUrl { url: String, reason: &'static str },

    #[error("application has no `{attribute}` attribute")]
    MissingAttribute { attribute: &'static str },

    #[error("invalid application instance '{value}'")]
    InvalidInstance { value: String },

    #[error("invalid job assignment '{value}': expected host:port=jid")]
    InvalidJobAssignment { value: String },

    #[error("failed to read configuration file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),
}
