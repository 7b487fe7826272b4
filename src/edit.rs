// edit.rs

use crate::entities::Entity;

/// At most one entity per list is being edited at a time. Beginning a new
/// edit while another is active silently discards the previous draft; the
/// stored entity is never touched until a save goes through the gateway.
#[derive(Debug, Default)]
pub struct EditSession<T: Entity + Clone> {
    draft: Option<T>,
}

impl<T: Entity + Clone> EditSession<T> {
    pub fn new() -> Self {
        Self { draft: None }
    }

    pub fn begin(&mut self, target: &T) {
        self.draft = Some(target.clone());
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    pub fn is_idle(&self) -> bool {
        self.draft.is_none()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.draft.as_ref().is_some_and(|d| d.id() == id)
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut T> {
        self.draft.as_mut()
    }

    /// Ends the session, handing the draft to the caller for saving.
    pub fn take(&mut self) -> Option<T> {
        self.draft.take()
    }
}
