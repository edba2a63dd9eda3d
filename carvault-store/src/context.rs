use std::fmt;
use std::sync::{Arc, LazyLock};

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Main,
    Background,
    Own,
}

static MAIN_LANE: LazyLock<Arc<Mutex<()>>> = LazyLock::new(Default::default);
static BACKGROUND_LANE: LazyLock<Arc<Mutex<()>>> = LazyLock::new(Default::default);

/// The lane a store runs its work on.
///
/// Operations issued through contexts that share a lane run one at a time in
/// call order. Every [`ExecutionContext::main`] handle in the process shares
/// one lane, as does every [`ExecutionContext::background`] handle; each
/// [`ExecutionContext::own`] call starts a new lane shared only by its clones.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    kind: ContextKind,
    name: Arc<str>,
    lane: Arc<Mutex<()>>,
}

impl ExecutionContext {
    fn on_lane(kind: ContextKind, name: impl Into<Arc<str>>, lane: Arc<Mutex<()>>) -> Self {
        Self {
            kind,
            name: name.into(),
            lane,
        }
    }

    /// The lane the interactive front end uses.
    pub fn main() -> Self {
        Self::on_lane(ContextKind::Main, "main", Arc::clone(&MAIN_LANE))
    }

    pub fn background() -> Self {
        Self::on_lane(
            ContextKind::Background,
            "background",
            Arc::clone(&BACKGROUND_LANE),
        )
    }

    /// A dedicated lane, named for logs.
    pub fn own(name: impl Into<Arc<str>>) -> Self {
        Self::on_lane(ContextKind::Own, name, Arc::default())
    }

    /// Whether work on `self` and `other` is serialized against each other.
    pub fn shares_lane_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lane, &other.lane)
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the lane. Tokio's mutex is fair, so waiters go in call order.
    pub(crate) async fn enter(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.lane).lock_owned().await
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
