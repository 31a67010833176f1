use crate::event::{Event, parse_command};
use crate::pool;
use crate::state::{DemoState, PanelSnapshot, Target};
use crate::visibility::VisibilityState;
use serde::Serialize;
use std::io::BufRead;
use std::thread;
use tokio::sync::mpsc;

/// One JSON line per panel change.
#[derive(Debug, Serialize)]
struct PanelRecord<'a> {
    elapsed_ms: u64,
    #[serde(flatten)]
    panel: &'a PanelSnapshot,
}

/// Display panel transitions in pipe mode (stdin commands in, JSON lines out)
pub async fn display_pipe(
    state: DemoState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (update_tx, mut update_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);
    tokio::spawn(pool::listen(event_rx, update_tx, state));

    // Blocking stdin reads stay off the runtime; EOF drops the sender and the
    // loop drains pending hides before closing the update channel.
    thread::spawn(move || read_commands(std::io::stdin().lock(), event_tx));

    let mut last_keys: [Option<(bool, bool, VisibilityState)>; 2] = [None, None];
    while let Some(upd) = update_rx.recv().await {
        for (slot, target) in [Target::Wrapper, Target::Hook].into_iter().enumerate() {
            let panel = upd.panel(target);
            if last_keys[slot] == Some(panel.key()) {
                continue;
            }
            last_keys[slot] = Some(panel.key());
            let record = PanelRecord {
                elapsed_ms: upd.elapsed.as_millis() as u64,
                panel,
            };
            println!("{}", serde_json::to_string(&record)?);
        }
    }
    Ok(())
}

fn read_commands<R: BufRead>(input: R, event_tx: mpsc::Sender<Event>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed, stopping input");
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(event)) => {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(line = %line.trim(), error = %e, "ignoring pipe command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::GraceDelay;
    use crate::wrapper::PhaseTokens;

    #[test]
    fn reader_forwards_parsed_commands_only() {
        let (tx, mut rx) = mpsc::channel(8);
        let input = "m\n# comment\nbogus\nhook off\nq\n";
        read_commands(input.as_bytes(), tx);

        assert_eq!(rx.try_recv().ok(), Some(Event::Toggle(Target::Wrapper)));
        assert_eq!(rx.try_recv().ok(), Some(Event::Set(Target::Hook, false)));
        assert_eq!(rx.try_recv().ok(), Some(Event::Shutdown));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn record_flattens_panel_fields() {
        let mut state = DemoState::new(GraceDelay::DEFAULT, true, PhaseTokens::default());
        state.request(Target::Hook, false);
        let upd = state.snapshot();
        let record = PanelRecord {
            elapsed_ms: 0,
            panel: &upd.hook,
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["target"], "hook");
        assert_eq!(json["state"], "visible_graceful");
        assert_eq!(json["class"], "unmount");
        assert_eq!(json["rendered"], true);
        assert_eq!(json["remaining_ms"], 1000);
        assert!(json.get("text").is_none());
    }
}
