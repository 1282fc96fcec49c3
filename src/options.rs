use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// Configures per-attempt timeout, retry budget and error surfacing.
///
/// Built fresh for every operation call; nothing here is shared between calls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one. `0` behaves as `1`.
    pub max_retries: u32,
    /// Delay before the second attempt; doubled for each one after.
    pub base_delay: Duration,
    /// Ceiling on the exponential component of the delay.
    pub max_delay: Duration,
    /// Wall-clock deadline for a single attempt.
    pub timeout: Duration,
    /// Return terminal failures as `Err` instead of logging them.
    pub verbose: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(5),
            verbose: false,
        }
    }
}

impl RetryConfig {
    /// Returns the config with `verbose` switched on.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub(crate) fn attempt_budget(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Kind of work an event records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Model,
    #[default]
    Tool,
    Chain,
}

/// Arguments for [`start`](crate::start).
#[derive(Clone)]
pub struct StartOptions {
    /// Falls back to `HH_API_KEY`.
    pub api_key: Option<String>,
    /// Falls back to `HH_PROJECT`. Optional for `hh_` managed keys.
    pub project: Option<String>,
    /// Defaults to the resolved project name.
    pub session_name: Option<String>,
    /// Falls back to `HH_SOURCE`, then `"dev"`.
    pub source: Option<String>,
    /// Generated locally when absent.
    pub session_id: Option<String>,
    pub config: Option<Value>,
    pub inputs: Option<Value>,
    pub metadata: Option<Value>,
    pub user_properties: Option<Value>,
    /// Falls back to `HH_API_URL`, then the hosted endpoint.
    pub server_url: Option<String>,
    /// Verify TLS certificates. Disabling this is not recommended outside
    /// local development.
    pub verify: bool,
    pub retry: RetryConfig,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            project: None,
            session_name: None,
            source: None,
            session_id: None,
            config: None,
            inputs: None,
            metadata: None,
            user_properties: None,
            server_url: None,
            verify: true,
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for StartOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartOptions")
            .field("api_key", &redacted(&self.api_key))
            .field("project", &self.project)
            .field("session_name", &self.session_name)
            .field("source", &self.source)
            .field("session_id", &self.session_id)
            .field("server_url", &self.server_url)
            .field("verify", &self.verify)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Arguments for [`log`](crate::log).
#[derive(Clone)]
pub struct LogOptions {
    /// Falls back to `HH_API_KEY`.
    pub api_key: Option<String>,
    /// Falls back to `HH_PROJECT`. Optional for `hh_` managed keys.
    pub project: Option<String>,
    /// Falls back to `HH_SOURCE`, then `"dev"`.
    pub source: Option<String>,
    /// Required.
    pub event_name: Option<String>,
    /// Defaults to [`EventType::Tool`].
    pub event_type: Option<EventType>,
    /// Generated locally when absent.
    pub session_id: Option<String>,
    pub config: Option<Value>,
    pub inputs: Option<Value>,
    pub outputs: Option<Value>,
    pub metadata: Option<Value>,
    /// Defaults to 10 ms.
    pub duration_ms: Option<u64>,
    /// Falls back to `HH_API_URL`, then the hosted endpoint.
    pub server_url: Option<String>,
    pub verify: bool,
    pub retry: RetryConfig,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            project: None,
            source: None,
            event_name: None,
            event_type: None,
            session_id: None,
            config: None,
            inputs: None,
            outputs: None,
            metadata: None,
            duration_ms: None,
            server_url: None,
            verify: true,
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for LogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogOptions")
            .field("api_key", &redacted(&self.api_key))
            .field("project", &self.project)
            .field("source", &self.source)
            .field("event_name", &self.event_name)
            .field("event_type", &self.event_type)
            .field("session_id", &self.session_id)
            .field("duration_ms", &self.duration_ms)
            .field("server_url", &self.server_url)
            .field("verify", &self.verify)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Arguments for [`update`](crate::update).
///
/// Unset optional fields are sent as `null` and left untouched server-side.
#[derive(Clone)]
pub struct UpdateOptions {
    /// Falls back to `HH_API_KEY`.
    pub api_key: Option<String>,
    /// Event or session id to update. Required.
    pub event_id: Option<String>,
    pub metadata: Option<Value>,
    pub feedback: Option<Value>,
    pub metrics: Option<Value>,
    pub outputs: Option<Value>,
    pub config: Option<Value>,
    pub user_properties: Option<Value>,
    pub duration_ms: Option<u64>,
    /// Falls back to `HH_API_URL`, then the hosted endpoint.
    pub server_url: Option<String>,
    pub verify: bool,
    pub retry: RetryConfig,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            event_id: None,
            metadata: None,
            feedback: None,
            metrics: None,
            outputs: None,
            config: None,
            user_properties: None,
            duration_ms: None,
            server_url: None,
            verify: true,
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for UpdateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("api_key", &redacted(&self.api_key))
            .field("event_id", &self.event_id)
            .field("duration_ms", &self.duration_ms)
            .field("server_url", &self.server_url)
            .field("verify", &self.verify)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}
