mod event;
mod pool;
mod state;
mod timer;
mod ui;
mod visibility;
mod wrapper;

use crate::state::DemoState;
use crate::visibility::{ConfigError, GraceDelay};
use crate::wrapper::PhaseTokens;
use clap::Parser;
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Grace delay in milliseconds before an unmount takes effect.
    /// If omitted, the DELAY_UNMOUNT_MS env var is used, then 1000.
    #[arg(long, value_name = "MS", allow_hyphen_values = true)]
    delay: Option<GraceDelay>,
    /// Start with both components mounted
    #[arg(long)]
    start_visible: bool,
    /// Class token handed to the wrapped component while mounted
    #[arg(long, default_value = "mount")]
    mount_token: String,
    /// Class token handed to the wrapped component while unmounting
    #[arg(long, default_value = "unmount")]
    unmount_token: String,
    /// Read commands from stdin and print transitions as JSON lines (default is modern UI)
    #[arg(long)]
    pipe: bool,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: None,
            start_visible: false,
            mount_token: "mount".to_string(),
            unmount_token: "unmount".to_string(),
            pipe: false,
            debug_log: false,
        }
    }
}

impl Config {
    /// Resolve the grace delay: flag, then env var, then the default.
    fn grace_delay(&self) -> Result<GraceDelay, ConfigError> {
        if let Some(delay) = self.delay {
            return Ok(delay);
        }
        match std::env::var("DELAY_UNMOUNT_MS") {
            Ok(s) if !s.trim().is_empty() => s.parse(),
            _ => Ok(GraceDelay::default()),
        }
    }

    fn demo_state(&self) -> Result<DemoState, ConfigError> {
        let delay = self.grace_delay()?;
        let tokens = PhaseTokens::new(self.mount_token.as_str(), self.unmount_token.as_str())?;
        Ok(DemoState::new(delay, self.start_visible, tokens))
    }
}

fn init_tracing(debug_log: bool) {
    let fallback = if debug_log { "delayunmount=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    init_tracing(cfg.debug_log);

    // Bad delay or tokens are rejected before anything is scheduled.
    let state = cfg.demo_state()?;
    tracing::info!(pipe = cfg.pipe, start_visible = cfg.start_visible, "starting demo");

    let result = if cfg.pipe {
        crate::ui::pipe::display_pipe(state).await
    } else {
        crate::ui::modern::display_modern(state).await
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}
