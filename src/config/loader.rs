use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::LoggingConfig;
use crate::config::types::ServiceConfig;
use crate::scope::ScopeInput;

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate_service_config(&service_config)?;

    Ok(service_config)
}

fn validate_service_config(service_config: &ServiceConfig) -> Result<()> {
    for (idx, scope_config) in service_config.scopes.iter().enumerate() {
        let empty = match &scope_config.scope {
            ScopeInput::Text(text) => text.trim().is_empty(),
            ScopeInput::List(items) => items.iter().all(|s| s.trim().is_empty()),
        };
        if empty {
            bail!("scopes[{}]: scope must not be empty", idx);
        }
    }
    if service_config.settings.http_timeout_ms == Some(0) {
        bail!("settings.http_timeout_ms must be greater than 0");
    }
    Ok(())
}

/// Replace `${VAR}` / `${VAR:default}` with process environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
