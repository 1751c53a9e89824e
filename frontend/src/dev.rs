//! Development toolchain descriptor.
//!
//! A declarative description of how the dev server and build pipeline
//! behave: path alias, dev server port, API proxy and source map policy.
//! The [`crate::config`] module owns the backend origin; the proxy target
//! here resolves through the same function, so the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::config;

/// Source-root path alias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathAlias {
    /// Alias symbol
    pub alias: String,
    /// Directory the alias points at
    pub target: String,
}

impl Default for PathAlias {
    fn default() -> Self {
        Self {
            alias: "@".to_string(),
            target: "src".to_string(),
        }
    }
}

/// One proxy rule: requests under `prefix` forward to `target`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRule {
    /// Path prefix the rule applies to
    pub prefix: String,
    /// Upstream origin
    pub target: String,
    /// Rewrite the Host header to the target origin
    pub change_origin: bool,
    /// Verify upstream TLS certificates
    pub secure: bool,
}

impl Default for ProxyRule {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            target: config::api::DEFAULT_BASE_URL.to_string(),
            change_origin: true,
            secure: false,
        }
    }
}

/// Dev server behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DevServer {
    /// Listen port
    pub port: u16,
    /// Open the browser on startup
    pub open: bool,
    /// Proxy rules
    pub proxy: Vec<ProxyRule>,
}

impl Default for DevServer {
    fn default() -> Self {
        Self {
            port: 8080,
            open: true,
            proxy: vec![ProxyRule::default()],
        }
    }
}

/// The full development descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    /// Whether release builds keep source maps
    #[serde(rename = "productionSourceMap")]
    pub production_sourcemap: bool,
    /// Source-root alias
    pub alias: PathAlias,
    /// Dev server behaviour
    pub dev_server: DevServer,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            production_sourcemap: false,
            alias: PathAlias::default(),
            dev_server: DevServer::default(),
        }
    }
}

impl DevConfig {
    /// Build the descriptor with the proxy target resolved from the
    /// environment, through the same function the API client uses.
    pub fn resolve() -> Self {
        let mut dev = Self::default();
        let target = config::api::base_url();
        for rule in &mut dev.dev_server.proxy {
            rule.target = target.clone();
        }
        dev
    }

    /// Serialize to TOML for tooling consumption.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
