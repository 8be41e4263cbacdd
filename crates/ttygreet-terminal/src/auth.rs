//! External authenticator interface and per-attempt completion plumbing.
//!
//! Each authentication attempt gets its own single-slot channel. The
//! authenticator holds the sending half ([`CompletionHandle`]); the engine
//! holds the receiving half inside [`AuthSlot`]. Cancelling an attempt drops
//! the receiver, so a completion signalled afterwards goes nowhere.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use ttygreet_types::error::Result;

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Preferred session key, if the user has one.
    pub session: Option<String>,
    /// Whether the user already has a running session.
    pub logged_in: bool,
}

/// A desktop session that can be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub key: String,
    pub name: String,
}

/// The external user directory and authenticator (display manager).
pub trait Authenticator {
    fn users(&self) -> Vec<User>;

    fn sessions(&self) -> Vec<SessionInfo>;

    fn default_session(&self) -> Option<String>;

    /// Begin authenticating `username`. The authenticator must call
    /// `completion.complete()` once the attempt resolves either way.
    fn start_authentication(&mut self, username: &str, completion: CompletionHandle)
    -> Result<()>;

    /// Abandon the attempt in progress, if any.
    fn cancel_authentication(&mut self);

    /// Forward the user's secret for the attempt in progress.
    fn respond(&mut self, secret: &str) -> Result<()>;

    fn is_authenticated(&self) -> bool;

    fn in_authentication(&self) -> bool;

    fn start_session(&mut self, key: &str) -> Result<()>;

    fn shutdown(&mut self) -> Result<()>;

    fn restart(&mut self) -> Result<()>;

    fn suspend(&mut self) -> Result<()>;
}

/// Sending half of an attempt's completion channel.
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    tx: Sender<()>,
}

impl CompletionHandle {
    /// Signal that the attempt resolved. Returns `false` when the attempt
    /// was cancelled and nobody is listening any more.
    pub fn complete(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

struct ScheduledResponse {
    secret: String,
    due: Instant,
}

impl std::fmt::Debug for ScheduledResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledResponse")
            .field("secret", &"<redacted>")
            .field("due", &self.due)
            .finish()
    }
}

/// Engine-side state of the single outstanding authentication attempt.
#[derive(Debug)]
pub(crate) struct AuthSlot {
    attempt: Option<Receiver<()>>,
    scheduled: Option<ScheduledResponse>,
    delay: Duration,
    generation: u64,
}

impl AuthSlot {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            attempt: None,
            scheduled: None,
            delay,
            generation: 0,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.attempt.is_some()
    }

    /// Bumped every time a new attempt is opened.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Open a fresh attempt, replacing any previous one.
    pub(crate) fn open(&mut self) -> CompletionHandle {
        let (tx, rx) = mpsc::channel();
        self.attempt = Some(rx);
        self.scheduled = None;
        self.generation += 1;
        CompletionHandle { tx }
    }

    /// Drop the attempt and any secret still waiting to be forwarded.
    pub(crate) fn close(&mut self) {
        self.attempt = None;
        self.scheduled = None;
    }

    pub(crate) fn schedule(&mut self, secret: &str) {
        self.scheduled = Some(ScheduledResponse {
            secret: secret.to_string(),
            due: Instant::now() + self.delay,
        });
    }

    pub(crate) fn has_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Take the scheduled secret if its delay has elapsed at `now`.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.scheduled.as_ref().is_some_and(|s| s.due <= now) {
            self.scheduled.take().map(|s| s.secret)
        } else {
            None
        }
    }

    /// Whether the authenticator has signalled completion.
    pub(crate) fn poll_completion(&mut self) -> bool {
        match self.attempt.as_ref().map(Receiver::try_recv) {
            Some(Ok(())) => true,
            Some(Err(TryRecvError::Disconnected)) => {
                log::trace!("Completion handle dropped without a signal");
                false
            },
            Some(Err(TryRecvError::Empty)) | None => false,
        }
    }
}
