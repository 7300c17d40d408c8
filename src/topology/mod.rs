//! Domain model of an XDAQ deployment.
//!
//! - [`Program`]: everything in one topology file.
//! - [`Context`]: one executive at `host:port`, started and killed through jobcontrol.
//! - [`Application`]: one class/instance inside an executive, driven by SOAP commands.

mod application;
mod context;
mod program;

pub use application::*;
pub use context::*;
pub use program::*;
