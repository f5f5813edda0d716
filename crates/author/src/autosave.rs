//! Debounced autosave worker.
//!
//! Edits land in a single-slot cell: a newer edit replaces the pending one and
//! restarts the debounce window, so a burst of edits produces one save carrying
//! the latest content. At most one save runs at a time. An edit that arrives
//! while a save is in flight waits for it to finish and is then saved as a
//! follow-up.
//!
//! Each save tries the engine first and falls back to the local snapshot
//! store. Results are applied to the shared draft and published on a
//! `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use sessioncraft_domain::{AutosaveStatus, DraftPayload, DraftSession, SaveLocation, SessionId};

use crate::ports::{DraftStore, SnapshotStore};

/// The draft aggregate shared between the authoring session and the worker.
/// Locked only for the duration of a mutation, never across a network call.
pub type SharedDraft = Arc<Mutex<DraftSession>>;

/// The draft content as of one revision.
#[derive(Debug, Clone)]
struct PendingEdit {
    revision: u64,
    payload: DraftPayload,
}

#[derive(Debug)]
enum Command {
    Edit(PendingEdit),
    SaveNow,
}

/// Everything a single save needs.
struct SaveContext {
    session_id: SessionId,
    draft: SharedDraft,
    remote: Arc<dyn DraftStore>,
    local: Arc<dyn SnapshotStore>,
    status: watch::Sender<AutosaveStatus>,
}

impl SaveContext {
    /// Apply a status change to the draft and publish the resulting status.
    async fn update(&self, apply: impl FnOnce(&mut DraftSession)) {
        let mut draft = self.draft.lock().await;
        apply(&mut draft);
        self.status.send_replace(draft.autosave_status());
    }
}

pub struct AutosaveWorker {
    ctx: Arc<SaveContext>,
    debounce: Duration,
}

impl AutosaveWorker {
    pub fn new(
        session_id: SessionId,
        draft: SharedDraft,
        remote: Arc<dyn DraftStore>,
        local: Arc<dyn SnapshotStore>,
        debounce: Duration,
    ) -> Self {
        let (status, _) = watch::channel(AutosaveStatus::Idle);
        Self {
            ctx: Arc::new(SaveContext {
                session_id,
                draft,
                remote,
                local,
                status,
            }),
            debounce,
        }
    }

    /// Start the worker on the current runtime.
    pub fn spawn(self) -> AutosaveHandle {
        let (commands, receiver) = mpsc::unbounded_channel();
        let status = self.ctx.status.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(receiver, cancel.clone()));

        AutosaveHandle {
            commands,
            status,
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        let mut pending: Option<PendingEdit> = None;
        let mut deadline: Option<Instant> = None;
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                command = commands.recv() => match command {
                    Some(Command::Edit(edit)) => {
                        pending = Some(edit);
                        deadline = Some(Instant::now() + self.debounce);
                        self.ctx.status.send_replace(AutosaveStatus::Pending);
                    }
                    Some(Command::SaveNow) => {
                        if pending.is_some() {
                            deadline = Some(Instant::now());
                        }
                    }
                    None => break,
                },

                _ = join_save(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                }

                // Held back while a save is in flight; fires as soon as it resolves.
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() && in_flight.is_none() =>
                {
                    deadline = None;
                    if let Some(edit) = pending.take() {
                        in_flight = Some(tokio::spawn(persist(self.ctx.clone(), edit)));
                    }
                }
            }
        }

        if let Some(edit) = pending {
            tracing::debug!(
                session_id = %self.ctx.session_id,
                revision = edit.revision,
                "Autosave stopped before a pending edit was saved"
            );
        }
        join_save(&mut in_flight).await;
    }
}

async fn join_save(handle: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Autosave task panicked");
        }
    }
}

async fn persist(ctx: Arc<SaveContext>, edit: PendingEdit) {
    let PendingEdit { revision, payload } = edit;
    ctx.update(|draft| draft.mark_saving(revision)).await;

    let location = match ctx.remote.save(ctx.session_id, &payload).await {
        Ok(()) => Some(SaveLocation::Remote),
        Err(remote_err) => match ctx.local.save(ctx.session_id, &payload).await {
            Ok(()) => {
                tracing::warn!(
                    session_id = %ctx.session_id,
                    error = %remote_err,
                    "Remote autosave failed, kept local snapshot"
                );
                Some(SaveLocation::Local)
            }
            Err(local_err) => {
                tracing::error!(
                    session_id = %ctx.session_id,
                    remote_error = %remote_err,
                    local_error = %local_err,
                    "Autosave failed"
                );
                None
            }
        },
    };

    let snapshot = payload.snapshot();
    ctx.update(|draft| match location {
        Some(location) => draft.mark_saved(revision, snapshot, location),
        None => draft.mark_save_failed(revision),
    })
    .await;

    tracing::debug!(session_id = %ctx.session_id, revision, ?location, "Autosave finished");
}

/// Control side of a running [`AutosaveWorker`]. Dropping it stops the worker.
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<AutosaveStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Replace the pending edit and restart the debounce window.
    pub fn schedule(&self, revision: u64, payload: DraftPayload) {
        self.send(Command::Edit(PendingEdit { revision, payload }));
    }

    /// Save the pending edit without waiting for the debounce window.
    pub fn save_now(&self) {
        self.send(Command::SaveNow);
    }

    pub fn status(&self) -> AutosaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Stop the worker. A pending edit is dropped; a save already in flight
    /// is allowed to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Autosave worker panicked");
            }
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Autosave worker is not running, command dropped");
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
