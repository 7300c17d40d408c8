//! SOAP request bodies understood by XDAQ executives.

use std::path::Path;

use crate::config::JobControl;

pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XDAQ_NS: &str = "urn:xdaq-soap:3.0";

/// Content type sent with every SOAP request.
pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Wrap a body element in a SOAP 1.1 envelope.
fn envelope(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<SOAP-ENV:Envelope SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/" "#,
            r#"xmlns:SOAP-ENV="{}" xmlns:xdaq="{}">"#,
            "<SOAP-ENV:Header/>",
            "<SOAP-ENV:Body>{}</SOAP-ENV:Body>",
            "</SOAP-ENV:Envelope>"
        ),
        ENVELOPE_NS, XDAQ_NS, body
    )
}

/// Escape a value for use inside a double-quoted attribute.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// SOAPAction addressing one application by class and instance.
pub fn application_action(class_name: &str, instance: u32) -> String {
    format!("urn:xdaq-application:class={},instance={}", class_name, instance)
}

/// A bare command such as `Configure` or `ParameterQuery`.
pub fn command(name: &str) -> String {
    envelope(&format!("<xdaq:{}/>", name))
}

/// Ask jobcontrol to launch an executive on `port` with the given configuration file.
pub fn start_executive(settings: &JobControl, port: u16, config_path: &Path) -> String {
    let argv = format!("-p {} -c {}", port, config_path.display());
    let variables: String = settings
        .environment
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape(value)))
        .collect();

    envelope(&format!(
        r#"<xdaq:startXdaqExe execPath="{}" user="{}" argv="{}"><EnvironmentVariable{}/></xdaq:startXdaqExe>"#,
        escape(&settings.exec_path),
        escape(&settings.user),
        escape(&argv),
        variables
    ))
}

/// Ask jobcontrol to kill the executive started under `job_id` (`-1` when unknown).
pub fn kill_executive(settings: &JobControl, job_id: i64) -> String {
    envelope(&format!(
        r#"<xdaq:killExec user="{}" jid="{}"/>"#,
        escape(&settings.user),
        job_id
    ))
}
