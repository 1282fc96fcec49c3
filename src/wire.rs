use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{EventType, LoggerError, Result};

#[derive(Debug, Serialize)]
pub struct StartSessionRequest<'a> {
    pub session: SessionPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct SessionPayload<'a> {
    pub project: Option<&'a str>,
    pub session_name: Option<&'a str>,
    pub source: &'a str,
    pub session_id: &'a str,
    pub config: &'a Value,
    pub inputs: &'a Value,
    pub metadata: &'a Value,
    pub user_properties: &'a Value,
    pub start_time: u64,
}

#[derive(Debug, Serialize)]
pub struct CreateEventRequest<'a> {
    pub event: EventPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct EventPayload<'a> {
    pub session_id: &'a str,
    pub project: Option<&'a str>,
    pub event_name: &'a str,
    pub event_type: EventType,
    pub config: &'a Value,
    pub inputs: &'a Value,
    pub outputs: &'a Value,
    pub metadata: &'a Value,
    pub source: &'a str,
    pub start_time: u64,
    pub duration: u64,
}

/// Unset fields serialize as `null`.
#[derive(Debug, Serialize)]
pub struct UpdateEventRequest<'a> {
    pub event_id: &'a str,
    pub metadata: Option<&'a Value>,
    pub feedback: Option<&'a Value>,
    pub metrics: Option<&'a Value>,
    pub outputs: Option<&'a Value>,
    pub duration: Option<u64>,
    pub config: Option<&'a Value>,
    pub user_properties: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct StartSessionResponse {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateEventResponse {
    #[serde(default)]
    event_id: Option<String>,
}

pub(crate) fn parse_session_id(body: &str) -> Result<String> {
    let response = serde_json::from_str::<StartSessionResponse>(body).map_err(|err| {
        LoggerError::MalformedResponse(format!(
            "invalid session response JSON: {err}; body: {body}"
        ))
    })?;
    response
        .session_id
        .ok_or_else(|| LoggerError::MalformedResponse(format!("missing session_id; body: {body}")))
}

pub(crate) fn parse_event_id(body: &str) -> Result<String> {
    let response = serde_json::from_str::<CreateEventResponse>(body).map_err(|err| {
        LoggerError::MalformedResponse(format!("invalid event response JSON: {err}; body: {body}"))
    })?;
    response
        .event_id
        .ok_or_else(|| LoggerError::MalformedResponse(format!("missing event_id; body: {body}")))
}
