//! The public `start`, `log` and `update` operations.
//!
//! Each call resolves its options against an [`Environment`] snapshot,
//! validates them, and sends one logical request through
//! [`execute_with_retry`]. Terminal failures are surfaced according to
//! `RetryConfig::verbose`: returned as `Err` when set, otherwise logged
//! through `tracing` and turned into an absent result.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    env::{Environment, API_KEY_VAR, API_URL_VAR, PROJECT_VAR, SOURCE_VAR},
    retry::execute_with_retry,
    transport::{HttpTransport, RequestDescriptor, Transport},
    wire, EventType, LogOptions, LoggerError, Result, RetryConfig, StartOptions, UpdateOptions,
};

/// Hosted API endpoint used when neither an option nor `HH_API_URL` is set.
pub const DEFAULT_SERVER_URL: &str = "https://api.honeyhive.ai";
pub const DEFAULT_SOURCE: &str = "dev";
pub const DEFAULT_DURATION_MS: u64 = 10;
/// Keys with this prefix are scoped to a project server-side, so the project
/// name becomes optional.
pub const MANAGED_KEY_PREFIX: &str = "hh_";

/// Starts a session and returns the server-assigned session id.
///
/// Returns `Ok(None)` on failure unless `options.retry.verbose` is set.
pub async fn start(options: StartOptions) -> Result<Option<String>> {
    start_with(&HttpTransport, &Environment::capture(), options).await
}

/// Logs an event and returns the server-assigned event id.
///
/// Returns `Ok(None)` on failure unless `options.retry.verbose` is set.
pub async fn log(options: LogOptions) -> Result<Option<String>> {
    log_with(&HttpTransport, &Environment::capture(), options).await
}

/// Updates an existing event or session.
///
/// Failures are only observable when `options.retry.verbose` is set.
pub async fn update(options: UpdateOptions) -> Result<()> {
    update_with(&HttpTransport, &Environment::capture(), options).await
}

/// [`start`] with an explicit transport and environment snapshot.
pub async fn start_with<T: Transport>(
    transport: &T,
    env: &Environment,
    options: StartOptions,
) -> Result<Option<String>> {
    let retry = options.retry.clone();
    let outcome = match ResolvedSession::resolve(env, options) {
        Ok(session) => send_start(transport, &retry, &session).await,
        Err(err) => Err(err),
    };
    surface("start", &retry, outcome)
}

/// [`log`] with an explicit transport and environment snapshot.
pub async fn log_with<T: Transport>(
    transport: &T,
    env: &Environment,
    options: LogOptions,
) -> Result<Option<String>> {
    let retry = options.retry.clone();
    let outcome = match ResolvedEvent::resolve(env, options) {
        Ok(event) => send_log(transport, &retry, &event).await,
        Err(err) => Err(err),
    };
    surface("log", &retry, outcome)
}

/// [`update`] with an explicit transport and environment snapshot.
pub async fn update_with<T: Transport>(
    transport: &T,
    env: &Environment,
    options: UpdateOptions,
) -> Result<()> {
    let retry = options.retry.clone();
    let outcome = match ResolvedUpdate::resolve(env, options) {
        Ok(update) => send_update(transport, &retry, &update).await,
        Err(err) => Err(err),
    };
    surface("update", &retry, outcome).map(|_| ())
}

async fn send_start<T: Transport>(
    transport: &T,
    retry: &RetryConfig,
    session: &ResolvedSession,
) -> Result<String> {
    let session_id = execute_with_retry(retry, move || async move {
        let response = transport.send(session.request()?).await?.error_for_status()?;
        wire::parse_session_id(&response.body)
    })
    .await?;

    tracing::debug!(%session_id, "session started");
    Ok(session_id)
}

async fn send_log<T: Transport>(
    transport: &T,
    retry: &RetryConfig,
    event: &ResolvedEvent,
) -> Result<String> {
    let event_id = execute_with_retry(retry, move || async move {
        let response = transport.send(event.request()?).await?.error_for_status()?;
        wire::parse_event_id(&response.body)
    })
    .await?;

    tracing::debug!(%event_id, session_id = %event.session_id, "event logged");
    Ok(event_id)
}

async fn send_update<T: Transport>(
    transport: &T,
    retry: &RetryConfig,
    update: &ResolvedUpdate,
) -> Result<()> {
    execute_with_retry(retry, move || async move {
        transport.send(update.request()?).await?.error_for_status()?;
        Ok(())
    })
    .await?;

    tracing::debug!(event_id = %update.event_id, "event updated");
    Ok(())
}

fn surface<T>(
    operation: &'static str,
    retry: &RetryConfig,
    outcome: Result<T>,
) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(err) if retry.verbose => Err(err),
        Err(err) => {
            tracing::error!(operation, kind = ?err.kind(), "{err}");
            Ok(None)
        }
    }
}

struct Connection {
    api_key: String,
    server_url: String,
    verify: bool,
}

impl Connection {
    fn resolve(
        env: &Environment,
        api_key: Option<&str>,
        server_url: Option<&str>,
        verify: bool,
    ) -> Result<Self> {
        let api_key = env
            .resolve(api_key, API_KEY_VAR)
            .ok_or_else(|| LoggerError::MissingField("API key is required".to_owned()))?;
        let server_url = env
            .resolve(server_url, API_URL_VAR)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
        Ok(Self {
            api_key,
            server_url,
            verify,
        })
    }

    fn is_managed_key(&self) -> bool {
        self.api_key.starts_with(MANAGED_KEY_PREFIX)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server_url.trim_end_matches('/'))
    }

    fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<RequestDescriptor> {
        RequestDescriptor::json(method, self.endpoint(path), &self.api_key, body, self.verify)
    }

    fn resolve_project(
        &self,
        env: &Environment,
        project: Option<&str>,
    ) -> Result<Option<String>> {
        match env.resolve(project, PROJECT_VAR) {
            Some(project) => Ok(Some(project)),
            None if self.is_managed_key() => Ok(None),
            None => Err(LoggerError::MissingField(
                "Project name is required".to_owned(),
            )),
        }
    }
}

struct ResolvedSession {
    connection: Connection,
    project: Option<String>,
    session_name: Option<String>,
    source: String,
    session_id: String,
    config: Value,
    inputs: Value,
    metadata: Value,
    user_properties: Value,
}

impl ResolvedSession {
    fn resolve(env: &Environment, options: StartOptions) -> Result<Self> {
        let connection = Connection::resolve(
            env,
            options.api_key.as_deref(),
            options.server_url.as_deref(),
            options.verify,
        )?;
        let project = connection.resolve_project(env, options.project.as_deref())?;

        Ok(Self {
            session_name: options.session_name.or_else(|| project.clone()),
            source: resolve_source(env, options.source.as_deref()),
            session_id: options.session_id.unwrap_or_else(new_id),
            config: options.config.unwrap_or_else(empty_object),
            inputs: options.inputs.unwrap_or_else(empty_object),
            metadata: options.metadata.unwrap_or_else(empty_object),
            user_properties: options.user_properties.unwrap_or_else(empty_object),
            project,
            connection,
        })
    }

    fn request(&self) -> Result<RequestDescriptor> {
        let body = wire::StartSessionRequest {
            session: wire::SessionPayload {
                project: self.project.as_deref(),
                session_name: self.session_name.as_deref(),
                source: &self.source,
                session_id: &self.session_id,
                config: &self.config,
                inputs: &self.inputs,
                metadata: &self.metadata,
                user_properties: &self.user_properties,
                start_time: now_ms(),
            },
        };
        self.connection.request(Method::POST, "/session/start", &body)
    }
}

struct ResolvedEvent {
    connection: Connection,
    project: Option<String>,
    source: String,
    event_name: String,
    event_type: EventType,
    session_id: String,
    config: Value,
    inputs: Value,
    outputs: Value,
    metadata: Value,
    duration_ms: u64,
}

impl ResolvedEvent {
    fn resolve(env: &Environment, options: LogOptions) -> Result<Self> {
        let connection = Connection::resolve(
            env,
            options.api_key.as_deref(),
            options.server_url.as_deref(),
            options.verify,
        )?;
        let project = connection.resolve_project(env, options.project.as_deref())?;
        let event_name = options
            .event_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| LoggerError::MissingField("Event name is required".to_owned()))?;

        Ok(Self {
            source: resolve_source(env, options.source.as_deref()),
            event_type: options.event_type.unwrap_or_default(),
            session_id: options.session_id.unwrap_or_else(new_id),
            config: options.config.unwrap_or_else(empty_object),
            inputs: options.inputs.unwrap_or_else(empty_object),
            outputs: options.outputs.unwrap_or_else(empty_object),
            metadata: options.metadata.unwrap_or_else(empty_object),
            duration_ms: options.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            event_name,
            project,
            connection,
        })
    }

    fn request(&self) -> Result<RequestDescriptor> {
        let body = wire::CreateEventRequest {
            event: wire::EventPayload {
                session_id: &self.session_id,
                project: self.project.as_deref(),
                event_name: &self.event_name,
                event_type: self.event_type,
                config: &self.config,
                inputs: &self.inputs,
                outputs: &self.outputs,
                metadata: &self.metadata,
                source: &self.source,
                start_time: now_ms(),
                duration: self.duration_ms,
            },
        };
        self.connection.request(Method::POST, "/events", &body)
    }
}

struct ResolvedUpdate {
    connection: Connection,
    event_id: String,
    metadata: Option<Value>,
    feedback: Option<Value>,
    metrics: Option<Value>,
    outputs: Option<Value>,
    config: Option<Value>,
    user_properties: Option<Value>,
    duration_ms: Option<u64>,
}

impl ResolvedUpdate {
    fn resolve(env: &Environment, options: UpdateOptions) -> Result<Self> {
        let connection = Connection::resolve(
            env,
            options.api_key.as_deref(),
            options.server_url.as_deref(),
            options.verify,
        )?;
        let event_id = options
            .event_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| LoggerError::MissingField("Event ID is required".to_owned()))?;

        Ok(Self {
            connection,
            event_id,
            metadata: options.metadata,
            feedback: options.feedback,
            metrics: options.metrics,
            outputs: options.outputs,
            config: options.config,
            user_properties: options.user_properties,
            duration_ms: options.duration_ms,
        })
    }

    fn request(&self) -> Result<RequestDescriptor> {
        let body = wire::UpdateEventRequest {
            event_id: &self.event_id,
            metadata: self.metadata.as_ref(),
            feedback: self.feedback.as_ref(),
            metrics: self.metrics.as_ref(),
            outputs: self.outputs.as_ref(),
            duration: self.duration_ms,
            config: self.config.as_ref(),
            user_properties: self.user_properties.as_ref(),
        };
        self.connection.request(Method::PUT, "/events", &body)
    }
}

fn resolve_source(env: &Environment, source: Option<&str>) -> String {
    env.resolve(source, SOURCE_VAR)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_owned())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
