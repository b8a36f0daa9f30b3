//! Configuration read from the environment.
//!
//! Everything here is resolved before a graph is built, so a bad value fails
//! fast with [`Error::Config`] instead of surfacing mid-turn.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MCP_SERVER_NAME: &str = "mcp";

/// Look up a variable, treating empty values as unset.
fn var<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// The process environment, skipping variables that are not valid UTF-8.
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Connection settings for the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: parse_url("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            timeout: OPENAI_TIMEOUT,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::config(format!("{key} is not a valid URL: {e}")))
}

/// Settings of the agent binary.
#[derive(Debug, Clone, Default)]
pub struct AgentSettings {
    /// `None` when `OPENAI_API_KEY` is not set; responses then use the template.
    pub openai: Option<OpenAiSettings>,
}

impl AgentSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_env_map(&process_env())
    }

    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        let Some(api_key) = var(env, "OPENAI_API_KEY") else {
            return Ok(Self { openai: None });
        };

        let mut openai = OpenAiSettings::new(api_key)?;
        if let Some(model) = var(env, "OPENAI_MODEL") {
            openai.model = model.to_string();
        }
        if let Some(base_url) = var(env, "OPENAI_BASE_URL") {
            openai.base_url = parse_url("OPENAI_BASE_URL", base_url)?;
        }

        Ok(Self {
            openai: Some(openai),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTransport {
    Http,
    Stdio,
}

impl FromStr for McpTransport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "stdio" => Ok(Self::Stdio),
            other => Err(Error::config(format!("unsupported MCP transport: {other}"))),
        }
    }
}

impl fmt::Display for McpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Stdio => f.write_str("stdio"),
        }
    }
}

/// One MCP server as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerConfig {
    pub name: String,
    pub transport: McpTransport,
    pub url: Option<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub headers: BTreeMap<String, String>,
}

impl McpServerConfig {
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Http,
            url: Some(url.into()),
            command: None,
            args: Vec::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Stdio,
            url: None,
            command: Some(command.into()),
            args,
            headers: BTreeMap::new(),
        }
    }

    /// The entry an MCP client expects for this server.
    ///
    /// Fails when the transport's required parameter is missing.
    pub fn to_client_entry(&self) -> Result<McpClientEntry> {
        match self.transport {
            McpTransport::Http => {
                let url = self.url.as_deref().filter(|u| !u.is_empty()).ok_or_else(|| {
                    Error::config(format!("MCP server '{}' requires 'url' for http", self.name))
                })?;
                parse_url("MCP_SERVER_URL", url)?;
                Ok(McpClientEntry::Http {
                    url: url.to_string(),
                    headers: (!self.headers.is_empty()).then(|| self.headers.clone()),
                })
            }
            McpTransport::Stdio => {
                let command = self
                    .command
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        Error::config(format!(
                            "MCP server '{}' requires 'command' for stdio",
                            self.name
                        ))
                    })?;
                Ok(McpClientEntry::Stdio {
                    command: command.to_string(),
                    args: self.args.clone(),
                })
            }
        }
    }
}

/// Connection entry handed to an MCP client, keyed by server name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum McpClientEntry {
    Http {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<BTreeMap<String, String>>,
    },
    Stdio {
        command: String,
        args: Vec<String>,
    },
}

pub type McpServers = BTreeMap<String, McpClientEntry>;

/// Resolve the MCP server from `MCP_*` variables.
///
/// Returns `Ok(None)` when the selected transport lacks its URL or command.
/// An unknown `MCP_TRANSPORT` is an error.
pub fn build_mcp_servers_from_env(env: &HashMap<String, String>) -> Result<Option<McpServers>> {
    let name = var(env, "MCP_SERVER_NAME").unwrap_or(DEFAULT_MCP_SERVER_NAME);
    let transport: McpTransport = var(env, "MCP_TRANSPORT").unwrap_or("http").parse()?;

    let config = match transport {
        McpTransport::Http => {
            let Some(url) = var(env, "MCP_SERVER_URL") else {
                return Ok(None);
            };
            let mut config = McpServerConfig::http(name, url);
            if let (Some(header), Some(token)) =
                (var(env, "MCP_AUTH_HEADER"), var(env, "MCP_AUTH_TOKEN"))
            {
                config.headers.insert(header.to_string(), token.to_string());
            }
            config
        }
        McpTransport::Stdio => {
            let Some(command) = var(env, "MCP_SERVER_COMMAND") else {
                return Ok(None);
            };
            let args = match var(env, "MCP_SERVER_ARGS") {
                Some(raw) => shell_words::split(raw)
                    .map_err(|e| Error::config(format!("MCP_SERVER_ARGS: {e}")))?,
                None => Vec::new(),
            };
            McpServerConfig::stdio(name, command, args)
        }
    };

    tracing::debug!(name, transport = %transport, "MCP server configured");
    Ok(Some(BTreeMap::from([(
        config.name.clone(),
        config.to_client_entry()?,
    )])))
}

/// Like [`build_mcp_servers_from_env`] over the process environment, but
/// requires a server to be configured.
pub fn require_mcp_servers() -> Result<McpServers> {
    require_mcp_servers_from(&process_env())
}

pub fn require_mcp_servers_from(env: &HashMap<String, String>) -> Result<McpServers> {
    build_mcp_servers_from_env(env)?.ok_or_else(|| {
        Error::config("no MCP server configured: set MCP_SERVER_URL or MCP_SERVER_COMMAND")
    })
}
