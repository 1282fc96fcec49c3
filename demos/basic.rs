use honeyhive_logger::{log, start, update, EventType, LogOptions, StartOptions, UpdateOptions};
use serde_json::json;

/// Reads `HH_API_KEY` / `HH_PROJECT` (and optionally `HH_API_URL`) from the
/// environment.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let session_id = start(StartOptions {
        session_name: Some("demo".to_owned()),
        inputs: Some(json!({"question": "What is the capital of France?"})),
        ..StartOptions::default()
    })
    .await?;
    println!("session: {session_id:?}");

    let event_id = log(LogOptions {
        session_id,
        event_name: Some("openai.chat".to_owned()),
        event_type: Some(EventType::Model),
        config: Some(json!({"model": "gpt-4o"})),
        outputs: Some(json!({"answer": "Paris"})),
        duration_ms: Some(420),
        ..LogOptions::default()
    })
    .await?;
    println!("event: {event_id:?}");

    if let Some(event_id) = event_id {
        update(UpdateOptions {
            event_id: Some(event_id),
            feedback: Some(json!({"rating": 5})),
            ..UpdateOptions::default()
        })
        .await?;
    }

    Ok(())
}
