//! Control client for XDAQ deployments.
//!
//! A topology file lists [`Context`]s (one executive per `host:port`), each
//! hosting a number of [`Application`]s. [`Program`] loads the file and fans
//! job-control and SOAP commands out across everything it describes.

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod soap;
pub mod topology;
pub mod xml;

pub use client::{ClientError, HttpResponse};
pub use config::JobControl;
pub use error::TopologyError;
pub use topology::{AppState, Application, Context, Program};
