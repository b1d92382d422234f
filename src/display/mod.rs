//! # Display Module
//!
//! Console presenter for the published controller snapshot.
//!
//! This module handles:
//! - Formatting a snapshot as a one-line status (text mode)
//! - Formatting a snapshot as a JSON Lines record (jsonl mode)
//! - Rendering at most once per refresh interval, always the latest snapshot
//!
//! The presenter performs no normalization of its own.

pub mod overlay;

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DisplayConfig;
use crate::controller::snapshot::ControllerSnapshot;
use overlay::OverlayAttributes;

/// Longest device id shown in text mode.
const MAX_ID_CHARS: usize = 40;

/// Output format of the console presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    Text,
    Jsonl,
}

impl DisplayFormat {
    /// Parses the `display.format` config value. Unknown values read as text.
    pub fn from_config(format: &str) -> Self {
        match format {
            "jsonl" => Self::Jsonl,
            _ => Self::Text,
        }
    }
}

/// One JSON Lines record.
#[derive(Debug, Serialize)]
struct StatusRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    snapshot: &'a ControllerSnapshot,
    overlay: OverlayAttributes,
}

/// Formats the human-readable status line.
///
/// # Examples
///
/// ```
/// use dualsense_overlay::controller::snapshot::ControllerSnapshot;
/// use dualsense_overlay::display::status_line;
///
/// let line = status_line(&ControllerSnapshot::disconnected());
/// assert_eq!(line, "No controller connected");
/// ```
pub fn status_line(snapshot: &ControllerSnapshot) -> String {
    if !snapshot.connected {
        return "No controller connected".to_string();
    }

    let id = if snapshot.id.chars().count() > MAX_ID_CHARS {
        let truncated: String = snapshot.id.chars().take(MAX_ID_CHARS).collect();
        format!("{}...", truncated)
    } else {
        snapshot.id.clone()
    };

    let pressed: Vec<&str> = snapshot
        .pressed_buttons()
        .into_iter()
        .map(|b| b.name())
        .collect();

    format!(
        "{} | L-Stick: ({:.2}, {:.2}) | R-Stick: ({:.2}, {:.2}) \
         | L2: {:.0}% | R2: {:.0}% | Buttons: [{}]",
        id,
        snapshot.left_stick.x,
        snapshot.left_stick.y,
        snapshot.right_stick.x,
        snapshot.right_stick.y,
        snapshot.l2 * 100.0,
        snapshot.r2 * 100.0,
        pressed.join(" "),
    )
}

/// Formats one JSON Lines record with the current UTC timestamp.
pub fn jsonl_record(snapshot: &ControllerSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(&StatusRecord {
        timestamp: Utc::now().to_rfc3339(),
        snapshot,
        overlay: OverlayAttributes::from_snapshot(snapshot, 1.0),
    })
}

/// Formats a snapshot in the given format.
pub fn render(snapshot: &ControllerSnapshot, format: DisplayFormat) -> serde_json::Result<String> {
    match format {
        DisplayFormat::Text => Ok(status_line(snapshot)),
        DisplayFormat::Jsonl => jsonl_record(snapshot),
    }
}

/// Renders snapshots to `out` until cancelled or the poller goes away.
///
/// Renders the current snapshot immediately, then once per change, waiting
/// at least `refresh_interval_ms` between two records. Changes arriving in
/// between collapse into the latest snapshot.
pub async fn run_display<W: Write>(
    mut state: watch::Receiver<ControllerSnapshot>,
    config: &DisplayConfig,
    mut out: W,
    cancel: CancellationToken,
) {
    let format = DisplayFormat::from_config(&config.format);
    let refresh = Duration::from_millis(config.refresh_interval_ms);
    debug!("Display running in {:?} mode every {:?}", format, refresh);

    loop {
        let snapshot = state.borrow_and_update().clone();
        match render(&snapshot, format) {
            Ok(line) => {
                if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                    warn!("Failed to write status: {}", e);
                    return;
                }
            }
            Err(e) => warn!("Failed to encode status record: {}", e),
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(refresh) => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = state.changed() => {
                if changed.is_err() {
                    debug!("Snapshot source closed, stopping display");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::snapshot::StickState;

    fn sample() -> ControllerSnapshot {
        ControllerSnapshot {
            connected: true,
            id: "DualSense Wireless Controller".to_string(),
            cross: true,
            l1: true,
            l2: 0.456,
            r2: 1.0,
            r2_pressed: true,
            left_stick: StickState { x: 0.0, y: -0.5, pressed: false },
            right_stick: StickState { x: 0.25, y: 0.0, pressed: true },
            ..ControllerSnapshot::default()
        }
    }

    #[test]
    fn test_status_line_connected() {
        let line = status_line(&sample());
        assert_eq!(
            line,
            "DualSense Wireless Controller | L-Stick: (0.00, -0.50) | R-Stick: (0.25, 0.00) \
             | L2: 46% | R2: 100% | Buttons: [cross l1 r2 r3]"
        );
    }

    #[test]
    fn test_status_line_truncates_long_id() {
        let mut state = sample();
        state.id =
            "Sony Interactive Entertainment DualSense Wireless Controller (054c:0ce6)".to_string();

        let line = status_line(&state);
        assert!(line.starts_with("Sony Interactive Entertainment DualSense... |"));
    }

    #[test]
    fn test_status_line_disconnected() {
        assert_eq!(status_line(&ControllerSnapshot::disconnected()), "No controller connected");
    }

    #[test]
    fn test_jsonl_record_fields() {
        let record = jsonl_record(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&record).unwrap();

        assert!(value["timestamp"].is_string());
        assert_eq!(value["connected"], true);
        assert_eq!(value["cross"], true);
        assert_eq!(value["left_stick"]["y"], -0.5);
        assert_eq!(value["r2_pressed"], true);
        assert_eq!(value["overlay"]["live"], true);
        assert!(!record.contains('\n'));
    }

    #[test]
    fn test_display_format_from_config() {
        assert_eq!(DisplayFormat::from_config("jsonl"), DisplayFormat::Jsonl);
        assert_eq!(DisplayFormat::from_config("text"), DisplayFormat::Text);
        assert_eq!(DisplayFormat::from_config("other"), DisplayFormat::Text);
    }

    #[tokio::test]
    async fn test_run_display_renders_until_source_closes() {
        let (sender, receiver) = watch::channel(ControllerSnapshot::disconnected());
        let config = DisplayConfig {
            format: "text".to_string(),
            refresh_interval_ms: 1,
        };

        let writer = tokio::spawn(async move {
            let mut out = Vec::new();
            run_display(receiver, &config, &mut out, CancellationToken::new()).await;
            out
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        sender.send_replace(sample());
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(sender);

        let out = String::from_utf8(writer.await.unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.first(), Some(&"No controller connected"));
        assert!(lines.last().unwrap().starts_with("DualSense Wireless Controller |"));
    }

    #[tokio::test]
    async fn test_run_display_stops_on_cancel() {
        let (_sender, receiver) = watch::channel(ControllerSnapshot::disconnected());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut out = Vec::new();
        run_display(receiver, &DisplayConfig::default(), &mut out, cancel).await;

        assert_eq!(String::from_utf8(out).unwrap(), "No controller connected\n");
    }
}
