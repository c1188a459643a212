use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A process-wide unique identifier of a simulated object.
///
/// Ids are never reused. Cloning an object from a preset must allocate a new id for the
/// clone (and all of its children).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniqueId(u64);

impl UniqueId {
    /// Allocates a new `UniqueId`.
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        assert!(id != 0, "UniqueId overflow");
        Self(id)
    }

    #[inline]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UniqueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The team an object belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Team(pub i32);

impl Team {
    /// The object is not part of any team.
    pub const NONE: Self = Self(-1);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }
}

impl Default for Team {
    fn default() -> Self {
        Self::NONE
    }
}
