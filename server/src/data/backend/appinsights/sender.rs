//! Background delivery of queued envelopes

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::envelope::Envelope;

/// Message from client handles to the sender task
#[derive(Debug)]
pub enum Command {
    Track(Box<Envelope>),
    /// Send everything queued so far, then acknowledge
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct SenderOptions {
    pub track_url: String,
    pub max_batch_size: usize,
    pub flush_interval: Duration,
}

/// Spawn the delivery loop.
///
/// Envelopes are batched and POSTed as one JSON array per request. Delivery
/// failures are logged and dropped: the relay never retries. On shutdown the
/// queue is drained and sent once more before the task exits.
pub fn spawn(
    http: reqwest::Client,
    options: SenderOptions,
    mut rx: mpsc::Receiver<Command>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut batch: Vec<Envelope> = Vec::with_capacity(options.max_batch_size);
        let mut timer = tokio::time::interval(options.flush_interval);
        timer.tick().await; // Skip immediate first tick

        loop {
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    // A closed channel means nobody can signal shutdown anymore
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                cmd = rx.recv() => match cmd {
                    Some(Command::Track(envelope)) => {
                        batch.push(*envelope);
                        if batch.len() >= options.max_batch_size {
                            send_batch(&http, &options.track_url, &mut batch).await;
                        }
                    }
                    Some(Command::Flush(ack)) => {
                        send_batch(&http, &options.track_url, &mut batch).await;
                        let _ = ack.send(());
                    }
                    None => break,
                },
                _ = timer.tick() => {
                    send_batch(&http, &options.track_url, &mut batch).await;
                }
            }
        }

        // Drain whatever was accepted before shutdown
        rx.close();
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Track(envelope) => batch.push(*envelope),
                Command::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        for mut chunk in chunks(std::mem::take(&mut batch), options.max_batch_size) {
            send_batch(&http, &options.track_url, &mut chunk).await;
        }
        tracing::debug!("Telemetry sender stopped");
    })
}

fn chunks(items: Vec<Envelope>, size: usize) -> Vec<Vec<Envelope>> {
    let mut out = Vec::new();
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        out.push(iter.by_ref().take(size.max(1)).collect());
    }
    out
}

async fn send_batch(http: &reqwest::Client, url: &str, batch: &mut Vec<Envelope>) {
    if batch.is_empty() {
        return;
    }
    let items = std::mem::take(batch);
    let count = items.len();

    match http.post(url).json(&items).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::debug!(count, status = %response.status(), "Telemetry batch delivered");
        }
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(count, %status, body = %body, "Telemetry batch rejected by backend");
        }
        Err(e) => {
            tracing::warn!(count, error = %e, "Telemetry batch delivery failed");
        }
    }
}
