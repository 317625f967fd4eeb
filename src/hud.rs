//! Text HUD: renders pilot snapshots to a writer

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::OutputFormat;
use crate::pilot::{SnapshotBuilder, TickSnapshot};

/// Format one snapshot as it appears on screen
pub fn render(snapshot: &TickSnapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}\n\n", snapshot),
        OutputFormat::Json => match serde_json::to_string(snapshot) {
            Ok(json) => json + "\n",
            Err(e) => {
                warn!(error = %e, "Failed to encode snapshot");
                String::new()
            }
        },
    }
}

/// Render every `interval` ticks until the pilot goes away
pub async fn run_hud<W>(
    mut rx: broadcast::Receiver<TickSnapshot>,
    mut out: W,
    interval: u32,
    format: OutputFormat,
) where
    W: AsyncWrite + Unpin,
{
    let mut builder = SnapshotBuilder::new(interval);

    loop {
        match rx.recv().await {
            Ok(snapshot) => {
                if !builder.should_render() {
                    continue;
                }
                let frame = render(&snapshot, format);
                if let Err(e) = out.write_all(frame.as_bytes()).await {
                    debug!(error = %e, "HUD output closed");
                    break;
                }
                if let Err(e) = out.flush().await {
                    debug!(error = %e, "HUD flush failed");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(lagged = n, "HUD lagged, skipping {} snapshots", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Snapshot channel closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BotSensors;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn snapshot(turn: u64) -> TickSnapshot {
        let sensors = BotSensors {
            turn,
            energy: 100.0,
            ..BotSensors::default()
        };
        SnapshotBuilder::build(&sensors, 0, Vec::new(), None)
    }

    #[test]
    fn json_frames_are_single_lines() {
        let frame = render(&snapshot(4), OutputFormat::Json);
        assert_eq!(frame.matches('\n').count(), 1);
        let value: serde_json::Value = serde_json::from_str(frame.trim()).unwrap();
        assert_eq!(value["turn"], 4);
    }

    #[tokio::test]
    async fn renders_every_nth_snapshot() {
        let (tx, rx) = broadcast::channel(16);
        for turn in 1..=4 {
            tx.send(snapshot(turn)).unwrap();
        }
        drop(tx);

        let expected_one = render(&snapshot(2), OutputFormat::Json);
        let expected_two = render(&snapshot(4), OutputFormat::Json);
        let out = tokio_test::io::Builder::new()
            .write(expected_one.as_bytes())
            .write(expected_two.as_bytes())
            .build();

        run_hud(rx, out, 2, OutputFormat::Json).await;
    }

    /// Accepts every write and fails every flush
    #[derive(Default)]
    struct BrokenFlush {
        writes: usize,
    }

    impl AsyncWrite for BrokenFlush {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.writes += 1;
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn stops_after_failed_flush() {
        let (tx, rx) = broadcast::channel(8);
        for turn in 1..=3 {
            tx.send(snapshot(turn)).unwrap();
        }
        drop(tx);

        let mut out = BrokenFlush::default();
        run_hud(rx, &mut out, 1, OutputFormat::Text).await;
        assert_eq!(out.writes, 1);
    }

    #[tokio::test]
    async fn disabled_hud_writes_nothing() {
        let (tx, rx) = broadcast::channel(4);
        tx.send(snapshot(1)).unwrap();
        drop(tx);
        let out = tokio_test::io::Builder::new().build();
        run_hud(rx, out, 0, OutputFormat::Text).await;
    }
}
