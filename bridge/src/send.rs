use std::{io::Read as _, path::Path};

use anyhow::Context as _;
use config::Config;
use eventsource_stream::Eventsource as _;
use futures::StreamExt as _;
use http::header::CONTENT_TYPE;
use interceptor::AdapterClient;
use llm::stream::{StreamAccumulator, parse_event};

pub async fn run(config: &Config, request: &Path) -> anyhow::Result<()> {
    let body = read_request(request)?;
    let client = AdapterClient::new(config)?;

    log::debug!("Sending request to {}", client.messages_url());

    let response = client.post_messages(body).await?;
    let status = response.status();

    let is_event_stream = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"));

    if is_event_stream && status.is_success() {
        return print_stream(response.into_body()).await;
    }

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .context("Failed to read response body")?;

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&body)),
    }

    if !status.is_success() {
        anyhow::bail!("Request failed with status {status}");
    }

    Ok(())
}

/// Prints every event as it arrives, then the reassembled message.
async fn print_stream(body: axum::body::Body) -> anyhow::Result<()> {
    let mut events = body.into_data_stream().eventsource();
    let mut accumulator = StreamAccumulator::new();

    while let Some(event) = events.next().await {
        let event = event.context("Failed to read event stream")?;

        println!("event: {}\ndata: {}\n", event.event, event.data);

        let parsed = parse_event(&event.event, &event.data)?;
        accumulator.push(parsed)?;
    }

    let message = accumulator.finish()?;

    println!("{}", serde_json::to_string_pretty(&message)?);

    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("Failed to read request from stdin")?;

        return Ok(body);
    }

    std::fs::read(path).with_context(|| format!("Failed to read request from {}", path.display()))
}
