//! Session snapshots.
//!
//! The signed-in admin's permissions live in an immutable [`SessionSnapshot`]
//! that is replaced wholesale. Consumers hold a [`SessionHandle`], read the
//! current snapshot, or subscribe to replacements.
//!
//! Every sign-in, sign-out and refresh bumps the snapshot epoch. A profile
//! fetch records the epoch it started in and its result is dropped if the
//! epoch moved on while it was in flight, so only the latest fetch lands.

use std::sync::Arc;

use tokio::sync::watch;

use crate::profile::ProfileSource;
use crate::types::Actor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Profile fetch has not completed yet.
    Loading,
    Ready(Arc<Actor>),
    /// Profile fetch failed; no permissions are known.
    Failed(String),
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub epoch: u64,
    pub state: SessionState,
}

impl SessionSnapshot {
    pub fn loading() -> Self {
        Self {
            epoch: 0,
            state: SessionState::Loading,
        }
    }

    pub fn ready(actor: Actor) -> Self {
        Self {
            epoch: 0,
            state: SessionState::Ready(Arc::new(actor)),
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        match &self.state {
            SessionState::Ready(actor) => Some(actor),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Arc<SessionSnapshot>>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    /// A bootstrapping session: `Loading` until the first refresh lands.
    pub fn new() -> Self {
        Self::with_snapshot(SessionSnapshot::loading())
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.tx.subscribe()
    }

    /// Start a new session. Permissions are unknown until [`refresh`](Self::refresh).
    pub fn sign_in(&self) {
        self.advance(SessionState::Loading);
    }

    /// End the session. Any profile fetch still in flight will be ignored.
    pub fn sign_out(&self) {
        self.advance(SessionState::SignedOut);
    }

    fn advance(&self, state: SessionState) {
        self.tx.send_modify(|snap| {
            *snap = Arc::new(SessionSnapshot {
                epoch: snap.epoch + 1,
                state,
            });
        });
    }

    /// Fetch the profile and publish the result. A `Ready` snapshot stays in
    /// place while the fetch runs; any other state is shown as `Loading`.
    /// Starting a refresh supersedes any fetch still in flight.
    pub async fn refresh(&self, source: &dyn ProfileSource) -> Arc<SessionSnapshot> {
        let mut epoch = 0;
        self.tx.send_if_modified(|snap| {
            epoch = snap.epoch + 1;
            let keep = matches!(snap.state, SessionState::Ready(_) | SessionState::Loading);
            let state = if keep {
                snap.state.clone()
            } else {
                SessionState::Loading
            };
            *snap = Arc::new(SessionSnapshot { epoch, state });
            // Only a visible state change is announced.
            !keep
        });

        let state = match source.current_role_and_permissions().await {
            Ok(profile) => SessionState::Ready(Arc::new(profile.into_actor())),
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch failed");
                SessionState::Failed(e.to_string())
            }
        };

        self.tx.send_if_modified(|snap| {
            if snap.epoch != epoch {
                tracing::debug!(
                    started = epoch,
                    current = snap.epoch,
                    "dropping stale profile response"
                );
                return false;
            }
            *snap = Arc::new(SessionSnapshot { epoch, state });
            true
        });

        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::profile::Profile;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct Fixed(Result<Profile, String>);

    #[async_trait]
    impl ProfileSource for Fixed {
        async fn current_role_and_permissions(&self) -> Result<Profile, AuthError> {
            self.0.clone().map_err(AuthError::Internal)
        }
    }

    /// Blocks until released, so a test can act while the fetch is in flight.
    struct Gated {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProfileSource for Gated {
        async fn current_role_and_permissions(&self) -> Result<Profile, AuthError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(Profile {
                role: "Admin".into(),
                permissions: vec!["events_view".into()],
            })
        }
    }

    fn editor() -> Profile {
        Profile {
            role: "Editor".into(),
            permissions: vec!["events_view".into(), "events_edit".into()],
        }
    }

    #[tokio::test]
    async fn starts_loading() {
        let session = SessionHandle::new();
        assert_eq!(session.snapshot().state, SessionState::Loading);
    }

    #[tokio::test]
    async fn refresh_publishes_actor() {
        let session = SessionHandle::new();
        let snap = session.refresh(&Fixed(Ok(editor()))).await;
        let actor = snap.actor().unwrap();
        assert_eq!(actor.role, "Editor");
        assert!(actor.permissions.contains("events_edit"));
    }

    #[tokio::test]
    async fn refresh_failure_is_not_loading() {
        let session = SessionHandle::new();
        let snap = session.refresh(&Fixed(Err("offline".into()))).await;
        assert!(matches!(snap.state, SessionState::Failed(ref m) if m.contains("offline")));
    }

    #[tokio::test]
    async fn sign_out_clears_profile_and_bumps_epoch() {
        let session = SessionHandle::new();
        session.refresh(&Fixed(Ok(editor()))).await;
        let before = session.snapshot().epoch;
        session.sign_out();
        let snap = session.snapshot();
        assert_eq!(snap.state, SessionState::SignedOut);
        assert_eq!(snap.epoch, before + 1);
    }

    #[tokio::test]
    async fn subscribers_see_replacement() {
        let session = SessionHandle::new();
        let mut rx = session.subscribe();
        session.refresh(&Fixed(Ok(editor()))).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().actor().is_some());
    }

    #[tokio::test]
    async fn stale_response_after_sign_out_is_ignored() {
        let session = SessionHandle::new();
        let source = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });

        let task = {
            let session = session.clone();
            let source = source.clone();
            tokio::spawn(async move { session.refresh(&*source).await })
        };

        source.started.notified().await;
        session.sign_out();
        source.release.notify_one();
        task.await.unwrap();

        assert_eq!(session.snapshot().state, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn ready_snapshot_survives_while_refreshing() {
        let session = SessionHandle::with_snapshot(SessionSnapshot::ready(Actor::new(
            "Editor",
            ["events_view"],
        )));
        let source = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });

        let task = {
            let session = session.clone();
            let source = source.clone();
            tokio::spawn(async move { session.refresh(&*source).await })
        };

        source.started.notified().await;
        assert_eq!(session.snapshot().actor().unwrap().role, "Editor");
        source.release.notify_one();
        let snap = task.await.unwrap();
        assert_eq!(snap.actor().unwrap().role, "Admin");
    }

    #[tokio::test]
    async fn older_overlapping_refresh_does_not_overwrite_newer() {
        let session = SessionHandle::new();
        let slow = Arc::new(Gated {
            started: Notify::new(),
            release: Notify::new(),
        });

        let task = {
            let session = session.clone();
            let slow = slow.clone();
            tokio::spawn(async move { session.refresh(&*slow).await })
        };

        slow.started.notified().await;
        let snap = session.refresh(&Fixed(Ok(editor()))).await;
        assert_eq!(snap.actor().unwrap().role, "Editor");

        slow.release.notify_one();
        task.await.unwrap();

        assert_eq!(session.snapshot().actor().unwrap().role, "Editor");
    }
}
