use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Identity of an input handler.
///
/// Widgets keep their tag in retained state so that the handler they declare
/// every frame is recognised as the same one. `Tag::default()` allocates a
/// fresh tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u64);

impl Tag {
    pub fn new() -> Self {
        Tag(NEXT_TAG.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new()
    }
}
