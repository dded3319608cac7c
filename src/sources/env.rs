use std::collections::HashMap;

use crate::utils::constants::ENV_KEYS;

/// Read-only lookup into whatever configuration store backs the fallbacks
/// (`gauth.clientId`, `google.scope`, ...).
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment, translating dotted camelCase keys to
/// upper snake case: `gauth.clientId` -> `GAUTH_CLIENT_ID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn var_name(key: &str) -> String {
        let mut name = String::with_capacity(key.len() + 4);
        let mut prev_lower = false;
        for c in key.chars() {
            if c == '.' || c == '-' {
                name.push('_');
                prev_lower = false;
                continue;
            }
            if c.is_ascii_uppercase() && prev_lower {
                name.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            name.push(c.to_ascii_uppercase());
        }
        name
    }
}

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::var_name(key)).ok()
    }
}

/// In-memory key/value store.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    values: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every known key currently set in the process environment.
    pub fn from_process() -> Self {
        let values = ENV_KEYS
            .iter()
            .filter_map(|key| ProcessEnv.get(key).map(|value| (key.to_string(), value)))
            .collect();
        Self { values }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.values.extend(values);
    }
}

impl From<HashMap<String, String>> for StaticEnv {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl EnvSource for StaticEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
