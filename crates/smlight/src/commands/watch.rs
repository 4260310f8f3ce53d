//! Live event streaming.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use smlight_api::{DeviceClient, EventKind, MessageEvent};
use tokio_util::sync::CancellationToken;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

fn render_event(format: OutputFormat, event: &MessageEvent) -> Result<String, CliError> {
    match format {
        OutputFormat::Plain => Ok(format!("{}: {}", event.event_type, event.data)),
        OutputFormat::Json | OutputFormat::JsonCompact => {
            // Structured payloads stay structured
            let data = serde_json::from_str::<serde_json::Value>(&event.data)
                .unwrap_or_else(|_| serde_json::Value::String(event.data.clone()));
            output::render_json(
                &json!({ "event": event.event_type, "data": data }),
                matches!(format, OutputFormat::JsonCompact),
            )
        }
    }
}

pub async fn handle(
    client: &DeviceClient,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = match args.kind {
        Some(ref name) => Some(EventKind::from_wire(name).ok_or_else(|| {
            CliError::Validation {
                field: "kind".into(),
                reason: format!("unknown event type '{name}'"),
            }
        })?),
        None => None,
    };

    let sse = client.sse();
    if args.legacy {
        sse.set_legacy_api(true);
    }

    let cancel = CancellationToken::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let format = global.output;
    let quiet = global.quiet;
    let limit = args.count;

    let disposer = {
        let cancel = cancel.clone();
        let seen = Arc::clone(&seen);
        sse.register_callback(kind, move |event: &MessageEvent| {
            let n = seen.fetch_add(1, Ordering::Relaxed) + 1;
            if limit.is_some_and(|max| n > max) {
                return;
            }
            match render_event(format, event) {
                Ok(line) => output::print_output(&line, quiet),
                Err(e) => tracing::warn!(error = %e, "failed to render event"),
            }
            if limit.is_some_and(|max| n >= max) {
                cancel.cancel();
            }
        })
    };

    tracing::info!(url = %sse.url(), ?kind, "watching device events");
    let handle = sse.spawn(cancel.clone());

    tokio::select! {
        () = cancel.cancelled() => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            cancel.cancel();
        }
    }

    if let Err(e) = handle.await {
        tracing::debug!(error = %e, "event task ended abnormally");
    }
    disposer.dispose();
    Ok(())
}
