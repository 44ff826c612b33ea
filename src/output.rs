//! Event printer.
//!
//! One task owns the output sink and drains the event channel, so lines
//! from concurrently completing probes are never interleaved.

use std::io::{self, Write};

use ::time::{format_description::well_known, OffsetDateTime};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::EventFormat;
use crate::types::Event;

/// JSON shape of one event line.
#[derive(Serialize, Debug)]
struct EventRecord<'a> {
    timestamp: String,
    kind: &'static str,
    host: &'a str,
    port: u16,
    open: bool,
    previous: Option<bool>,
}

/// Render one event as a single line without the trailing newline.
pub fn render(event: &Event, format: EventFormat) -> String {
    match format {
        EventFormat::Text => event.to_string(),
        EventFormat::Json => {
            let (kind, previous) = match event {
                Event::Open(_) => ("open", None),
                Event::Changed { previous, .. } => ("changed", *previous),
            };
            let endpoint = event.endpoint();
            let record = EventRecord {
                timestamp: now_rfc3339(),
                kind,
                host: &endpoint.host,
                port: endpoint.port,
                open: event.is_open(),
                previous,
            };
            // Serializing a flat struct of strings, numbers and bools cannot fail.
            serde_json::to_string(&record).unwrap_or_else(|_| event.to_string())
        }
    }
}

/// Spawn the printer task. It writes one flushed line per event and
/// resolves to the number of lines written once every sender is dropped.
pub fn spawn_printer<W>(
    mut rx: mpsc::Receiver<Event>,
    format: EventFormat,
    mut sink: W,
) -> JoinHandle<io::Result<u64>>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = 0u64;
        while let Some(event) = rx.recv().await {
            writeln!(sink, "{}", render(&event, format))?;
            sink.flush()?;
            lines += 1;
        }
        Ok(lines)
    })
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
