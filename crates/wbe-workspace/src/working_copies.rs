//! In-memory working copies keyed by resource.

use std::cell::RefCell;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use wbe_source::Resource;

use crate::input::RevertOptions;
use crate::input::SaveOptions;
use crate::services::WorkingCopyService;

/// Tracks which documents have unsaved changes. Saving only clears the flag;
/// writing contents is left to whoever owns the text.
#[derive(Debug, Default)]
pub struct WorkingCopies {
    dirty: RefCell<FxHashMap<Resource, bool>>,
}

impl WorkingCopies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, resource: Resource) {
        self.dirty.borrow_mut().entry(resource).or_insert(false);
    }

    pub fn set_dirty(&self, resource: Resource, dirty: bool) {
        self.dirty.borrow_mut().insert(resource, dirty);
    }

    pub fn unregister(&self, resource: &Resource) {
        self.dirty.borrow_mut().remove(resource);
    }
}

#[async_trait(?Send)]
impl WorkingCopyService for WorkingCopies {
    fn has(&self, resource: &Resource) -> bool {
        self.dirty.borrow().contains_key(resource)
    }

    fn is_dirty(&self, resource: &Resource) -> bool {
        self.dirty.borrow().get(resource).copied().unwrap_or(false)
    }

    async fn save(&self, resource: &Resource, _options: &SaveOptions) -> bool {
        if let Some(dirty) = self.dirty.borrow_mut().get_mut(resource) {
            *dirty = false;
        }
        true
    }

    /// There is no one to pick a new target, so save-as always cancels.
    async fn save_as(&self, _resource: &Resource, _options: &SaveOptions) -> Option<Resource> {
        None
    }

    async fn revert(&self, resource: &Resource, _options: &RevertOptions) -> bool {
        if let Some(dirty) = self.dirty.borrow_mut().get_mut(resource) {
            *dirty = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_clears_dirty_flag() {
        let copies = WorkingCopies::new();
        let resource = Resource::parse("file:///proj/a.ts").unwrap();
        assert!(!copies.has(&resource));

        copies.set_dirty(resource.clone(), true);
        assert!(copies.has(&resource));
        assert!(copies.is_dirty(&resource));

        assert!(copies.save(&resource, &SaveOptions::default()).await);
        assert!(!copies.is_dirty(&resource));
        assert!(copies.has(&resource));
    }
}
