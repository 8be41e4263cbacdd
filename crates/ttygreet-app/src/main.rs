//! ttygreet desktop entry point.
//!
//! Reads one line at a time from stdin and feeds it to the greeter terminal,
//! switching to unechoed key-by-key entry while a secret is expected, and
//! authenticating against the static directory from the config file. Exits
//! once a session has been started or a power action was requested.
//! Config path comes from the first CLI arg or `TTYGREET_CONFIG`.

mod console;
mod masked;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use console::ConsoleSink;
use ttygreet_terminal::{
    CommandRegistry, SessionEngine, SessionState, StaticDirectory, register_builtins,
};
use ttygreet_types::config::GreeterConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

type Engine = SessionEngine<StaticDirectory, ConsoleSink>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!(
        "Starting ttygreet on {} ({} users, {} sessions)",
        config.hostname,
        config.directory.users.len(),
        config.directory.sessions.len(),
    );

    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry)?;

    // The tty already shows what was typed.
    let mut terminal = config.terminal.clone();
    terminal.echo_input = false;

    let mut engine = SessionEngine::new(
        registry,
        StaticDirectory::new(&config.directory),
        ConsoleSink::new(terminal.scrollback_limit),
        config.hostname.clone(),
        terminal,
    );
    engine.boot();

    let interactive = io::stdin().is_terminal();
    loop {
        print!("{}", engine.prompt());
        io::stdout().flush()?;

        if interactive && engine.mode().is_masked() {
            let last = masked::read_secret(|key| engine.handle_key(key))?;
            println!();
            engine.handle_key(last);
        } else {
            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                log::info!("End of input");
                break;
            }
            engine.submit(line.trim_end_matches(['\r', '\n']));
        }
        wait_for_verification(&mut engine);

        if let Some(session) = engine.authenticator().active_session() {
            log::info!("Session {session} started, exiting");
            break;
        }
        if let Some(action) = engine.authenticator().power_action() {
            log::info!("Exiting for {action:?}");
            break;
        }
    }

    log::debug!(
        "Scrollback held {} lines at exit",
        engine.sink().scrollback().len()
    );
    Ok(())
}

fn load_config() -> Result<GreeterConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TTYGREET_CONFIG").ok())
        .map(PathBuf::from);
    match path {
        Some(path) => GreeterConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            log::info!("No config given, using defaults");
            Ok(GreeterConfig::default())
        },
    }
}

/// Drive the engine until the authenticator has answered, giving up after
/// `VERIFY_TIMEOUT`.
fn wait_for_verification(engine: &mut Engine) {
    let deadline = Instant::now() + VERIFY_TIMEOUT;
    while engine.state() == SessionState::Verifying {
        let now = Instant::now();
        if now >= deadline {
            log::warn!("Authenticator did not answer in time");
            engine.cancel();
            eprintln!("authentication timed out");
            return;
        }
        engine.poll(now);
        thread::sleep(POLL_INTERVAL);
    }
}
