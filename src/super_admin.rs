//! Backend-verified guard for the super-admin subtree.
//!
//! Unlike the other guards, this one does not trust the cached session role:
//! every mount asks `GET /super-admin-check` again. A failed or unreachable
//! check is a denial, indistinguishable from a confirmed non-super-admin.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    backend::BackendState,
    guard::{GuardState, Redirect, UNAUTHORIZED_PATH},
};

struct Shared {
    mounted: AtomicBool,
    state: watch::Sender<GuardState>,
}

impl Shared {
    /// Applies the backend verdict, unless the guard was unmounted meanwhile.
    fn settle(&self, confirmed: bool) {
        if !self.mounted.load(Ordering::SeqCst) {
            tracing::debug!("super-admin check resolved after unmount, discarding");
            return;
        }

        let next = if confirmed {
            GuardState::Allowed
        } else {
            GuardState::DeniedRedirect(Redirect::to(UNAUTHORIZED_PATH))
        };
        self.state.send_replace(next);
    }
}

/// SuperAdminGuard
///
/// One mount of the super-admin guard. It starts in `Checking`, spawns the
/// backend check, and moves to `Allowed` or a redirect to `/unauthorized`
/// when the check answers. Unmounting (explicitly or by dropping the guard)
/// makes any later answer a no-op.
pub struct SuperAdminGuard {
    shared: Arc<Shared>,
    check: Mutex<Option<JoinHandle<()>>>,
}

impl SuperAdminGuard {
    /// mount
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(backend: BackendState) -> Self {
        let (state, _) = watch::channel(GuardState::Checking);
        let shared = Arc::new(Shared {
            mounted: AtomicBool::new(true),
            state,
        });

        let task_shared = Arc::clone(&shared);
        let check = tokio::spawn(async move {
            let confirmed = match backend.super_admin_check().await {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    tracing::warn!("super-admin check failed, denying: {e}");
                    false
                }
            };
            task_shared.settle(confirmed);
        });

        Self {
            shared,
            check: Mutex::new(Some(check)),
        }
    }

    /// The current state of this mount.
    pub fn state(&self) -> GuardState {
        self.shared.state.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    /// settled
    ///
    /// Waits for the verdict. An unmounted guard never settles, so this
    /// returns its current (frozen) state instead of waiting forever.
    pub async fn settled(&self) -> GuardState {
        if !self.is_mounted() {
            return self.state();
        }

        let mut receiver = self.shared.state.subscribe();
        match receiver
            .wait_for(|state| !matches!(state, GuardState::Checking))
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// unmount
    ///
    /// Detaches the guard from its in-flight check. The request itself keeps
    /// running; its answer is discarded.
    pub fn unmount(&self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
    }

    /// finished
    ///
    /// Waits for the spawned backend check to complete, whether or not its
    /// answer was applied.
    pub async fn finished(&self) {
        let handle = match self.check.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("super-admin check task failed: {e}");
            }
        }
    }
}

impl Drop for SuperAdminGuard {
    fn drop(&mut self) {
        self.unmount();
    }
}
