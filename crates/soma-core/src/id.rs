use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter backing [`ElementId::fresh`].
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a text element for its whole lifetime.
///
/// Ids are never reused within a process, so an element restored from a
/// history snapshot can never collide with one created afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a new, never-before-seen id.
    pub fn fresh() -> Self {
        let id = ElementId(COUNTER.fetch_add(1, Ordering::Relaxed));
        id.reserve();
        id
    }

    /// Wrap a raw value (e.g. an id coming back from the host page).
    ///
    /// Bumps the allocator past `raw` so later `fresh()` ids stay unique.
    pub fn from_raw(raw: u64) -> Self {
        let id = ElementId(raw);
        id.reserve();
        id
    }

    pub fn get(self) -> u64 {
        self.0
    }

    fn reserve(self) {
        COUNTER.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
