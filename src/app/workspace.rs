//! Event loop driver: feeds actions into the store, hands effects to the
//! runtime and turns completion messages back into actions.

use crate::kernel::services::adapters::{AppMessage, AsyncRuntime, RuntimeServices};
use crate::kernel::services::ports::WorkspaceConfig;
use crate::kernel::{Action, AppState, Effect, Rejection, Store};
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

const MAX_MESSAGES_PER_POLL: usize = 256;

pub struct Workspace {
    store: Store,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    outstanding: usize,
    config: WorkspaceConfig,
}

impl Workspace {
    /// Starts the runtime, subscribes to auth changes and requests the
    /// current session.
    pub fn new(config: WorkspaceConfig, services: RuntimeServices) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let runtime = AsyncRuntime::new(tx, services, config.worker_threads)?;
        runtime.watch_auth();

        let mut workspace = Self {
            store: Store::new(AppState::new(&config)),
            runtime,
            rx,
            outstanding: 0,
            config,
        };
        workspace.run_effect(Effect::LoadSession);
        tracing::info!(
            save_debounce_ms = workspace.config.save_debounce_ms,
            "workspace started"
        );
        Ok(workspace)
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Returns whether local state changed, or why the action was refused.
    pub fn dispatch(&mut self, action: Action) -> Result<bool, Rejection> {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        match result.rejected {
            Some(rejection) => Err(rejection),
            None => Ok(result.state_changed),
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        tracing::trace!(?effect, "run effect");
        self.outstanding += 1;
        self.runtime.run(effect);
    }

    fn handle_message(&mut self, message: AppMessage) -> bool {
        if message.is_completion() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        match self.dispatch(message.into_action()) {
            Ok(changed) => changed,
            Err(rejection) => {
                tracing::warn!(reason = %rejection, "completion rejected");
                false
            }
        }
    }

    /// Applies the messages that have already arrived.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGES_PER_POLL {
            match self.rx.try_recv() {
                Ok(message) => changed |= self.handle_message(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("runtime message channel closed");
                    break;
                }
            }
        }
        changed
    }

    /// Drains messages, then writes back drafts whose idle window has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.poll();
        changed |= self.dispatch(Action::Tick { now }).unwrap_or(false);
        changed
    }

    /// When the earliest buffered edit becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.state().drafts.next_deadline()
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }

    /// Blocks until every effect has reported back, or the timeout passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if self.is_idle() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(message) => {
                    self.handle_message(message);
                }
                Err(RecvTimeoutError::Timeout) => return self.is_idle(),
                Err(RecvTimeoutError::Disconnected) => return self.is_idle(),
            }
        }
    }

    /// Writes back every buffered edit and waits for the results.
    pub fn flush(&mut self, timeout: Duration) -> bool {
        let _ = self.dispatch(Action::FlushDrafts);
        self.wait_idle(timeout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workspace.rs"]
mod tests;
