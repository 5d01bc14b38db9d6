// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan manager — the caller-facing boundary of the session core.
//
// Enforces the single-flight policy: at most one session runs at a time, and
// a new `start_scan` cancels the running one without awaiting it.  Holds the
// one-deep buffer for a start request that arrives before any listener is
// attached, as an explicit slot rather than ambient global state.

use std::sync::Mutex;

use labscan_core::{LabscanError, ScanEvent, ScanRequest};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::session::{Collaborators, ListenerSlot, ScanSession};

/// Orchestrates scan sessions over a single listener channel.
///
/// All methods are synchronous and non-blocking; sessions run on the tokio
/// runtime the manager's methods are called from.  The listener lives in a
/// slot shared with every session, so sessions always emit to whichever
/// listener is attached at emission time.
pub struct ScanManager {
    collaborators: Collaborators,
    config: ScanConfig,
    listener: ListenerSlot,
    state: Mutex<ManagerState>,
}

#[derive(Default)]
struct ManagerState {
    /// Start arguments buffered while no listener is attached (newest wins).
    pending: Option<serde_json::Value>,
    current: Option<ActiveScan>,
}

struct ActiveScan {
    id: Uuid,
    token: CancellationToken,
}

impl ScanManager {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_config(collaborators, ScanConfig::default())
    }

    pub fn with_config(collaborators: Collaborators, config: ScanConfig) -> Self {
        Self {
            collaborators,
            config,
            listener: ListenerSlot::default(),
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Attach (or replace) the event listener, returning its receiving end.
    ///
    /// A running session's remaining events follow the new listener from the
    /// next emission on.  A start request buffered before any listener
    /// existed is replayed exactly once.
    pub fn attach_listener(&self) -> mpsc::UnboundedReceiver<ScanEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listener.replace(tx);
        let pending = {
            let mut state = self.state.lock().expect("manager lock poisoned");
            state.pending.take()
        };
        if let Some(args) = pending {
            debug!("replaying buffered start request");
            self.start_scan(args);
        }
        rx
    }

    /// Drop the listener, cancel any running session, and clear the pending
    /// slot.
    pub fn detach_listener(&self) {
        self.listener.clear();
        let mut state = self.state.lock().expect("manager lock poisoned");
        state.pending = None;
        if let Some(active) = state.current.take() {
            debug!(session = %active.id, "cancelling session on listener detach");
            active.token.cancel();
        }
    }

    /// Start a scan for the given caller arguments.  Fire-and-forget: the
    /// outcome is observed only on the event stream.
    ///
    /// A running session is cancelled first (not awaited).  Unparseable
    /// arguments produce an `invalid_request` error event and no session.
    #[instrument(skip_all)]
    pub fn start_scan(&self, args: serde_json::Value) {
        let mut state = self.state.lock().expect("manager lock poisoned");

        if !self.listener.is_attached() {
            debug!("no listener attached, buffering start request");
            state.pending = Some(args);
            return;
        }

        let Some(request) = ScanRequest::from_value(&args) else {
            warn!("rejecting malformed scan arguments");
            self.listener.send(ScanEvent::failure(&LabscanError::InvalidRequest(
                "Invalid scan arguments".into(),
            )));
            return;
        };

        if let Some(superseded) = state.current.take() {
            info!(session = %superseded.id, "superseding running session");
            superseded.token.cancel();
        }

        let token = CancellationToken::new();
        let session = ScanSession::new(
            request,
            self.config,
            self.collaborators.clone(),
            self.listener.clone(),
            token.clone(),
        );
        let id = session.id();
        info!(session = %id, "starting scan session");
        state.current = Some(ActiveScan { id, token });
        tokio::spawn(session.run());
    }

    /// Cancel the running session, if any.  Idempotent; a cancelled session
    /// emits no further events and no terminal event.
    pub fn cancel_scan(&self) {
        let mut state = self.state.lock().expect("manager lock poisoned");
        if let Some(active) = state.current.take() {
            info!(session = %active.id, "cancelling scan session");
            active.token.cancel();
        }
    }
}
