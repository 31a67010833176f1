//! Modern TUI mode: both delayed-unmount mechanisms side by side.
//!
//! The event loop uses `tokio::select!` to handle:
//! - Snapshots from the visibility loop in `pool`
//! - User keyboard input (m/h to toggle, q/ESC to quit)
//! - A frame timer that keeps the grace countdown moving while a panel is
//!   unmounting

use crate::event::Event as DemoEvent;
use crate::pool;
use crate::state::{DemoState, PanelSnapshot, Update};
use crate::ui::styles::PanelStyles;
use crate::visibility::VisibilityState;
use crossterm::{
    event::{Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use std::io::{self};
use std::pin::Pin;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

type UiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// UI state for the modern TUI mode
pub struct ModernUIState {
    pub last_update: Option<Update>,
    /// Instant the last Update arrived; used to run the countdown locally
    pub last_update_instant: Option<Instant>,
    pub should_exit: bool,
}

impl ModernUIState {
    pub fn new() -> Self {
        Self {
            last_update: None,
            last_update_instant: None,
            should_exit: false,
        }
    }
}

pub async fn display_modern(state: DemoState) -> UiResult<()> {
    let (update_tx, mut update_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);
    let pool_task = tokio::spawn(pool::listen(event_rx, update_tx, state));

    enable_raw_mode().map_err(to_boxed_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(to_boxed_err)?;
    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend) {
        Ok(mut terminal) => run(&mut terminal, &mut update_rx, &event_tx).await,
        Err(e) => Err(to_boxed_err(e)),
    };
    disable_raw_mode().map_err(to_boxed_err)?;
    execute!(io::stdout(), LeaveAlternateScreen).map_err(to_boxed_err)?;

    // Quitting tears the demo down; pending hides are dropped.
    let _ = event_tx.send(DemoEvent::Shutdown).await;
    drop(event_tx);
    drop(update_rx);
    if let Err(e) = pool_task.await {
        tracing::warn!(error = %e, "visibility loop ended abnormally");
    }
    result
}

async fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    update_rx: &mut mpsc::Receiver<Update>,
    event_tx: &mpsc::Sender<DemoEvent>,
) -> UiResult<()> {
    let styles = PanelStyles::default();
    let mut state = ModernUIState::new();
    let mut next_frame: Option<Pin<Box<Sleep>>> = None;

    // Key events are read on a plain OS thread and forwarded; the thread
    // stops once the receiver is dropped.
    let (key_tx, mut key_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(ev) = crossterm::event::read()
                        && key_tx.try_send(ev).is_err()
                        && key_tx.is_closed()
                    {
                        break;
                    }
                }
                Ok(false) => {
                    if key_tx.is_closed() {
                        break;
                    }
                }
                Err(_) => thread::sleep(Duration::from_millis(100)),
            }
        }
    });

    redraw_and_reschedule(terminal, &state, &styles, &mut next_frame)?;
    while !state.should_exit {
        tokio::select! {
            biased;

            update = update_rx.recv() => {
                process_update(update, &mut state);
                redraw_and_reschedule(terminal, &state, &styles, &mut next_frame)?;
            }

            maybe_key = key_rx.recv() => {
                match maybe_key {
                    Some(ev) => {
                        if let Some(cmd) = process_key(ev, &mut state)
                            && event_tx.send(cmd).await.is_err()
                        {
                            state.should_exit = true;
                        }
                        redraw_and_reschedule(terminal, &state, &styles, &mut next_frame)?;
                    }
                    None => state.should_exit = true,
                }
            }

            _ = async {
                if let Some(s) = &mut next_frame {
                    s.as_mut().await;
                } else {
                    futures_util::future::pending::<()>().await;
                }
            } => {
                redraw_and_reschedule(terminal, &state, &styles, &mut next_frame)?;
            }
        }
    }
    Ok(())
}

fn process_update(update: Option<Update>, state: &mut ModernUIState) {
    let Some(update) = update else {
        // Visibility loop gone - nothing left to show
        state.should_exit = true;
        return;
    };
    state.last_update = Some(update);
    state.last_update_instant = Some(Instant::now());
}

/// Map a key press to a demo event. Quit keys only flag the exit.
fn process_key(event: Event, state: &mut ModernUIState) -> Option<DemoEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.should_exit = true;
            None
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_exit = true;
            None
        }
        KeyCode::Char('m') => Some(DemoEvent::Toggle(crate::state::Target::Wrapper)),
        KeyCode::Char('h') => Some(DemoEvent::Toggle(crate::state::Target::Hook)),
        _ => None,
    }
}

fn redraw_and_reschedule<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &ModernUIState,
    styles: &PanelStyles,
    next_frame: &mut Option<Pin<Box<Sleep>>>,
) -> UiResult<()> {
    let since = state
        .last_update_instant
        .map(|i| i.elapsed())
        .unwrap_or_default();
    terminal
        .draw(|f| draw(f, state.last_update.as_ref(), since, styles))
        .map_err(to_boxed_err)?;

    let counting = state.last_update.as_ref().is_some_and(Update::any_graceful);
    *next_frame = counting.then(|| Box::pin(tokio::time::sleep(FRAME_INTERVAL)));
    Ok(())
}

fn draw(f: &mut Frame, update: Option<&Update>, since: Duration, styles: &PanelStyles) {
    let [header, wrapper_area, hook_area, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let controls = Line::from(vec![
        Span::styled("[m]", styles.key),
        Span::raw(" Toggle Mount   "),
        Span::styled("[h]", styles.key),
        Span::raw(" Toggle Mount Custom Hook   "),
        Span::styled("[q]", styles.key),
        Span::raw(" Quit"),
    ]);
    f.render_widget(
        Paragraph::new(controls).block(Block::bordered().title(" delayunmount ")),
        header,
    );

    let Some(update) = update else {
        f.render_widget(Paragraph::new("Starting..."), wrapper_area);
        return;
    };
    draw_panel(f, wrapper_area, "Delay wrapper", &update.wrapper, since, styles);
    draw_panel(f, hook_area, "Custom hook", &update.hook, since, styles);

    let status = format!(
        "v{}  t={:.1}s",
        update.version,
        (update.elapsed + since).as_secs_f64()
    );
    f.render_widget(Paragraph::new(Span::styled(status, styles.status)), footer);
}

fn draw_panel(
    f: &mut Frame,
    area: Rect,
    title: &str,
    panel: &PanelSnapshot,
    since: Duration,
    styles: &PanelStyles,
) {
    let block = Block::bordered().title(format!(" {} (delay {}) ", title, panel.delay));
    let width = block.inner(area).width.max(1) as usize;
    f.render_widget(
        Paragraph::new(panel_lines(panel, since, width, styles)).block(block),
        area,
    );
}

fn panel_lines(
    panel: &PanelSnapshot,
    since: Duration,
    width: usize,
    styles: &PanelStyles,
) -> Vec<Line<'static>> {
    let Some(class) = panel.class.as_deref() else {
        return vec![Line::from(Span::styled("(unmounted)", styles.unmounted))];
    };
    let style = match panel.state {
        VisibilityState::VisibleGraceful => styles.unmount,
        _ => styles.mount,
    };
    let mut lines: Vec<Line<'static>> = textwrap::wrap(panel.text, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l.into_owned(), style)))
        .collect();

    let mut status = format!("class=\"{class}\"");
    if let Some(ms) = panel.remaining_ms {
        let left = Duration::from_millis(ms).saturating_sub(since);
        status.push_str(&format!("  unmounting in {:.1}s", left.as_secs_f64()));
    }
    lines.push(Line::from(Span::styled(status, styles.status)));
    lines
}

fn to_boxed_err<E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Target;
    use crate::visibility::GraceDelay;
    use crate::wrapper::PhaseTokens;
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn keys_map_to_toggles_and_quit() {
        let mut state = ModernUIState::new();
        assert_eq!(
            process_key(key(KeyCode::Char('m'), KeyModifiers::NONE), &mut state),
            Some(DemoEvent::Toggle(Target::Wrapper))
        );
        assert_eq!(
            process_key(key(KeyCode::Char('h'), KeyModifiers::NONE), &mut state),
            Some(DemoEvent::Toggle(Target::Hook))
        );
        assert!(!state.should_exit);
        assert_eq!(
            process_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut state),
            None
        );
        assert!(state.should_exit);
    }

    #[tokio::test(start_paused = true)]
    async fn draws_cards_by_phase() {
        let mut demo = DemoState::new(GraceDelay::DEFAULT, true, PhaseTokens::default());
        demo.toggle(Target::Hook);
        let update = demo.snapshot();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| draw(f, Some(&update), Duration::from_millis(250), &PanelStyles::default()))
            .unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Delay wrapper"));
        assert!(text.contains("class=\"mount\""));
        assert!(text.contains("class=\"unmount\""));
        assert!(text.contains("unmounting in 0.8s"));
    }

    #[test]
    fn unmounted_panel_shows_placeholder() {
        let demo_panel = PanelSnapshot {
            target: Target::Wrapper,
            requested: false,
            rendered: false,
            state: VisibilityState::Hidden,
            class: None,
            remaining_ms: None,
            text: crate::state::WRAPPER_TEXT,
            delay: GraceDelay::DEFAULT,
        };
        let lines = panel_lines(&demo_panel, Duration::ZERO, 40, &PanelStyles::default());
        assert_eq!(lines.len(), 1);
    }
}
