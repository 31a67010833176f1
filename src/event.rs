use crate::state::{DemoState, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Toggle(Target),
    Set(Target, bool),
    /// Tear everything down now; pending hides are dropped.
    Shutdown,
}

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn process_event(event: Event, state: &mut DemoState) -> Flow {
    match event {
        Event::Toggle(target) => state.toggle(target),
        Event::Set(target, requested) => state.request(target, requested),
        Event::Shutdown => return Flow::Exit,
    }
    Flow::Continue
}

/// Parse one pipe-mode command line.
///
/// Grammar: `<target> [on|off|toggle]` or `quit`. Blank lines and `#`
/// comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Event>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line.split_whitespace().map(|p| p.to_lowercase());
    let head = parts.next().unwrap_or_default();
    if matches!(head.as_str(), "quit" | "q" | "exit") {
        return Ok(Some(Event::Shutdown));
    }
    let target = match head.as_str() {
        "wrapper" | "w" | "m" | "mount" => Target::Wrapper,
        "hook" | "h" => Target::Hook,
        other => return Err(format!("unknown target {other:?}")),
    };
    let event = match parts.next().as_deref() {
        None | Some("toggle") => Event::Toggle(target),
        Some("on" | "show" | "true") => Event::Set(target, true),
        Some("off" | "hide" | "false") => Event::Set(target, false),
        Some(other) => return Err(format!("unknown action {other:?}")),
    };
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected argument {extra:?}"));
    }
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::GraceDelay;
    use crate::wrapper::PhaseTokens;

    #[test]
    fn parses_targets_and_actions() {
        assert_eq!(parse_command("m"), Ok(Some(Event::Toggle(Target::Wrapper))));
        assert_eq!(parse_command("  Hook OFF "), Ok(Some(Event::Set(Target::Hook, false))));
        assert_eq!(parse_command("wrapper on"), Ok(Some(Event::Set(Target::Wrapper, true))));
        assert_eq!(parse_command("h toggle"), Ok(Some(Event::Toggle(Target::Hook))));
        assert_eq!(parse_command("quit"), Ok(Some(Event::Shutdown)));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   # wait for it"), Ok(None));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_command("sidebar").is_err());
        assert!(parse_command("hook sideways").is_err());
        assert!(parse_command("hook on now").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn events_drive_state() {
        let mut state = DemoState::new(GraceDelay::DEFAULT, false, PhaseTokens::default());
        assert_eq!(process_event(Event::Toggle(Target::Wrapper), &mut state), Flow::Continue);
        assert!(state.wrapper.is_rendered());
        assert_eq!(process_event(Event::Set(Target::Hook, true), &mut state), Flow::Continue);
        assert!(state.hook.is_rendered());
        assert_eq!(process_event(Event::Shutdown, &mut state), Flow::Exit);
        assert_eq!(state.version, 2);
    }
}
