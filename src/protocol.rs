//! Control-plane request types
//!
//! A kill request is a form-encoded POST body with optional `pid`, `port`
//! and `service` fields. The first non-empty one, in that order, is used.
//! A repeated key keeps its first value; unknown keys are ignored.

pub const KILL_PATH: &str = "/kill";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
/// Upper bound on a kill request body
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Raw form fields of a kill request
#[derive(Debug, Clone, Default)]
pub struct KillForm {
    pub pid: Option<String>,
    pub port: Option<String>,
    pub service: Option<String>,
}

/// The selector a kill request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Unparsed, validated by the handler
    Pid(String),
    Port(String),
    Service(String),
}

impl FromIterator<(String, String)> for KillForm {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut form = KillForm::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "pid" => &mut form.pid,
                "port" => &mut form.port,
                "service" => &mut form.service,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        form
    }
}

impl KillForm {
    /// Pick the highest-priority non-empty field
    pub fn selector(&self) -> Option<Selector> {
        fn present(field: &Option<String>) -> Option<String> {
            field.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
        }

        present(&self.pid)
            .map(Selector::Pid)
            .or_else(|| present(&self.port).map(Selector::Port))
            .or_else(|| present(&self.service).map(Selector::Service))
    }
}
