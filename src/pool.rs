// pool.rs: Central event loop owning the demo state and both hide timers

use crate::event::{Event, Flow, process_event};
use crate::state::{DemoState, Target, Update};
use tokio::sync::mpsc;

/// Drive `state` from `event_rx`, publishing snapshots on `update_tx`.
///
/// Requests are polled before timers (`biased`), so a request always lands
/// before any hide it supersedes. `Event::Shutdown` tears down immediately.
/// When the event channel closes, pending hides are allowed to finish and the
/// loop exits once both panels are idle.
pub async fn listen(
    mut event_rx: mpsc::Receiver<Event>,
    update_tx: mpsc::Sender<Update>,
    mut state: DemoState,
) {
    tracing::info!(version = state.version, "visibility loop started");
    let mut last_sent: Option<u64> = None;
    let mut events_open = true;

    if !send_update(&state, &update_tx, &mut last_sent).await {
        state.teardown();
        return;
    }

    loop {
        if !events_open && state.is_idle() {
            break;
        }
        let flow = tokio::select! {
            biased;

            ev = event_rx.recv(), if events_open => match ev {
                Some(ev) => process_event(ev, &mut state),
                None => {
                    tracing::debug!("event channel closed, draining pending hides");
                    events_open = false;
                    Flow::Continue
                }
            },

            _ = state.wrapper.fired() => {
                state.mark_fired(Target::Wrapper);
                Flow::Continue
            }

            _ = state.hook.fired() => {
                state.mark_fired(Target::Hook);
                Flow::Continue
            }
        };

        if flow == Flow::Exit {
            break;
        }
        if !send_update(&state, &update_tx, &mut last_sent).await {
            break;
        }
    }

    let released = state.teardown();
    tracing::info!(released, "visibility loop stopped");
}

/// Send a snapshot if the state version moved. Returns false once the
/// receiver is gone.
async fn send_update(
    state: &DemoState,
    update_tx: &mpsc::Sender<Update>,
    last_sent: &mut Option<u64>,
) -> bool {
    if *last_sent == Some(state.version) {
        return true;
    }
    if update_tx.send(state.snapshot()).await.is_err() {
        return false;
    }
    *last_sent = Some(state.version);
    true
}
