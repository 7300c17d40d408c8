//! Fixed-width state table for a whole program.

use serde::Serialize;

use crate::topology::AppState;

const CONTEXT_WIDTH: usize = 40;
const CLASS_WIDTH: usize = 30;
const INSTANCE_WIDTH: usize = 4;

/// States of every application in one context.
#[derive(Debug, Clone, Serialize)]
pub struct ContextReport {
    /// `host:port`
    pub endpoint: String,
    pub job_id: Option<i64>,
    pub applications: Vec<ApplicationReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReport {
    pub class_name: String,
    pub instance: u32,
    pub state: AppState,
}

impl ContextReport {
    /// Label shown on the first row of the context.
    pub fn label(&self) -> String {
        format!("{} (job ID={})", self.endpoint, self.job_id.unwrap_or(-1))
    }
}

/// Render one line per application. The context label only appears on the
/// first line of each context; contexts without applications print nothing.
///
/// Example output:
/// ```text
/// daq01:40000 (job ID=1234)               pixel::CbcDaq                    0   Ready
///                                         pixel::CbcSupervisor             1   <uncontactable>
/// ```
pub fn render_states(contexts: &[ContextReport]) -> String {
    let mut output = String::new();
    for context in contexts {
        for (i, application) in context.applications.iter().enumerate() {
            let label = if i == 0 { context.label() } else { String::new() };
            output.push_str(&format!(
                "{:<cw$}{:<aw$}{:>iw$}   {}\n",
                label,
                application.class_name,
                application.instance,
                application.state,
                cw = CONTEXT_WIDTH,
                aw = CLASS_WIDTH,
                iw = INSTANCE_WIDTH,
            ));
        }
    }
    output
}
