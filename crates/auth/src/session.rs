use std::sync::{Arc, RwLock};

use inventario_core::ActorId;

/// Who is operating the ledger right now.
///
/// The ledger only reads the current actor for movement attribution; signing
/// in and out is owned by whatever hosts the session.
pub trait Session: Send + Sync {
    /// `None` when nobody is authenticated.
    fn current_actor_id(&self) -> Option<ActorId>;
}

impl<S> Session for Arc<S>
where
    S: Session + ?Sized,
{
    fn current_actor_id(&self) -> Option<ActorId> {
        (**self).current_actor_id()
    }
}

/// A session whose actor never changes (CLI runs, tests).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StaticSession {
    actor_id: Option<ActorId>,
}

impl StaticSession {
    pub fn authenticated(actor_id: ActorId) -> Self {
        Self {
            actor_id: Some(actor_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Session for StaticSession {
    fn current_actor_id(&self) -> Option<ActorId> {
        self.actor_id
    }
}

/// A session the host updates as its auth provider reports state changes.
#[derive(Debug, Default)]
pub struct InMemorySession {
    actor_id: RwLock<Option<ActorId>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the actor reported by the auth provider (`None` = signed out).
    pub fn set_actor(&self, actor_id: Option<ActorId>) {
        if let Ok(mut current) = self.actor_id.write() {
            *current = actor_id;
        }
    }
}

impl Session for InMemorySession {
    fn current_actor_id(&self) -> Option<ActorId> {
        self.actor_id.read().ok().and_then(|current| *current)
    }
}
