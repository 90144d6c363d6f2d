//! Node Identity and Service Environment
//!
//! The home page reports which host and node served it and which peers it
//! talked to. All of that comes from the process environment and is read on
//! every request.

use std::collections::HashMap;

// =============================================================================
// Variable Names
// =============================================================================

/// Kubernetes node the pod is scheduled on
pub const NODE_NAME: &str = "NODE_NAME";

/// `host:port` of the foo peer
pub const FOO_SERVICE_ADDR: &str = "FOO_SERVICE_ADDR";

/// `host:port` of the bar peer
pub const BAR_SERVICE_ADDR: &str = "BAR_SERVICE_ADDR";

// =============================================================================
// Environment Port
// =============================================================================

/// Source of host identity and environment variables
pub trait Environment: Send + Sync {
    /// Host name of the machine (empty if unavailable)
    fn hostname(&self) -> String;

    /// Value of an environment variable; unset and empty read the same
    fn var(&self, key: &str) -> Option<String>;
}

/// Snapshot of everything the home handler needs for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub hostname: String,
    pub node_name: String,
    pub foo_service_addr: Option<String>,
    pub bar_service_addr: Option<String>,
}

impl NodeIdentity {
    /// Read the identity from an environment
    pub fn load(env: &dyn Environment) -> Self {
        Self {
            hostname: env.hostname(),
            node_name: env.var(NODE_NAME).unwrap_or_default(),
            foo_service_addr: env.var(FOO_SERVICE_ADDR),
            bar_service_addr: env.var(BAR_SERVICE_ADDR),
        }
    }
}

// =============================================================================
// Process Environment
// =============================================================================

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn hostname(&self) -> String {
        system_hostname().unwrap_or_default()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    let mut buf = [0u8; 256];

    // SAFETY: buf is valid for buf.len() bytes; gethostname writes at most
    // that many and we look for the terminator ourselves.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..len]).into_owned())
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}

// =============================================================================
// Static Environment
// =============================================================================

/// Fixed environment, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    hostname: String,
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    /// Create an environment reporting `hostname` and no variables
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            vars: HashMap::new(),
        }
    }

    /// Set a variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_static_environment() {
        let env = StaticEnvironment::new("pod-1")
            .with_var(NODE_NAME, "node-a")
            .with_var(FOO_SERVICE_ADDR, "foo:8080");

        let identity = NodeIdentity::load(&env);

        assert_eq!(identity.hostname, "pod-1");
        assert_eq!(identity.node_name, "node-a");
        assert_eq!(identity.foo_service_addr.as_deref(), Some("foo:8080"));
        assert_eq!(identity.bar_service_addr, None);
    }

    #[test]
    fn test_empty_variable_reads_as_unset() {
        let env = StaticEnvironment::new("pod-1").with_var(BAR_SERVICE_ADDR, "");

        let identity = NodeIdentity::load(&env);

        assert_eq!(identity.bar_service_addr, None);
        assert_eq!(identity.node_name, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_hostname_available() {
        let hostname = ProcessEnvironment.hostname();
        assert!(!hostname.is_empty());
    }
}
