//! Snapshot of the `HH_*` environment variables.

use std::collections::HashMap;

pub const API_KEY_VAR: &str = "HH_API_KEY";
pub const PROJECT_VAR: &str = "HH_PROJECT";
pub const SOURCE_VAR: &str = "HH_SOURCE";
pub const API_URL_VAR: &str = "HH_API_URL";

const VARS: [&str; 4] = [API_KEY_VAR, PROJECT_VAR, SOURCE_VAR, API_URL_VAR];

/// Environment values consulted when an option is not passed explicitly.
///
/// Taken once per operation call and never mutated. Blank values are
/// treated as unset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Environment {
    values: HashMap<&'static str, String>,
}

impl Environment {
    /// Reads the process environment.
    pub fn capture() -> Self {
        let values = VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (*name, value)))
            .collect::<Vec<_>>();
        Self::from_pairs(values)
    }

    /// Builds a snapshot from explicit pairs. Unknown names are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (name, value) in pairs {
            let Some(known) = VARS.iter().find(|var| **var == name.as_ref()) else {
                continue;
            };
            let value = value.into();
            if !value.trim().is_empty() {
                values.insert(*known, value);
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Explicit value first, then the named variable.
    pub(crate) fn resolve(&self, explicit: Option<&str>, name: &str) -> Option<String> {
        explicit
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.get(name))
            .map(str::to_owned)
    }
}
