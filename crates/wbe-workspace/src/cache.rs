//! One editor input per canonical resource.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wbe_source::Resource;
use wbe_source::UriIdentity;

use crate::dispose::Subscription;
use crate::input::on_dispose;
use crate::input::EditorHandle;
use crate::input::FileEditorInput;
use crate::input::ResourceEditorInput;
use crate::input::UntitledEditorInput;

/// A cached input, kept with its concrete type so cache hits can be updated.
#[derive(Clone, Debug)]
pub enum CachedEditorInput {
    File(Rc<FileEditorInput>),
    Resource(Rc<ResourceEditorInput>),
    Untitled(Rc<UntitledEditorInput>),
}

impl CachedEditorInput {
    pub fn handle(&self) -> EditorHandle {
        match self {
            CachedEditorInput::File(input) => input.clone(),
            CachedEditorInput::Resource(input) => input.clone(),
            CachedEditorInput::Untitled(input) => input.clone(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    input: CachedEditorInput,
    _eviction: Subscription,
}

type Entries = Rc<RefCell<FxHashMap<Resource, CacheEntry>>>;

/// Maps canonical resources to the single live input for them.
///
/// An entry stays until its input is disposed; the cache never disposes
/// inputs itself except in [`dispose_all`](Self::dispose_all).
#[derive(Debug)]
pub struct EditorInputCache {
    identity: Rc<UriIdentity>,
    entries: Entries,
}

impl EditorInputCache {
    pub fn new(identity: Rc<UriIdentity>) -> Self {
        Self {
            identity,
            entries: Rc::default(),
        }
    }

    /// The input for `resource`, building it with `create` on a miss.
    ///
    /// On a hit `on_hit` sees the existing input and `create` is not called.
    pub fn get_or_create(
        &self,
        resource: &Resource,
        create: impl FnOnce() -> CachedEditorInput,
        on_hit: impl FnOnce(&CachedEditorInput),
    ) -> CachedEditorInput {
        let key = self.identity.canonicalize(resource);

        let cached = self
            .entries
            .borrow()
            .get(&key)
            .map(|entry| entry.input.clone());
        if let Some(input) = cached {
            tracing::trace!(resource = %key, "editor input cache hit");
            on_hit(&input);
            return input;
        }

        let input = create();
        let handle = input.handle();
        let eviction = {
            let entries = Rc::downgrade(&self.entries);
            let key = key.clone();
            let id = handle.id();
            on_dispose(handle.as_ref(), move || {
                let Some(entries) = entries.upgrade() else {
                    return;
                };
                let mut entries = entries.borrow_mut();
                if entries
                    .get(&key)
                    .is_some_and(|entry| entry.input.handle().id() == id)
                {
                    let evicted = entries.remove(&key);
                    drop(entries);
                    drop(evicted);
                    tracing::debug!(resource = %key, "evicted disposed editor input");
                }
            })
        };

        tracing::debug!(resource = %key, id = %handle.id(), "cached new editor input");
        self.entries.borrow_mut().insert(
            key,
            CacheEntry {
                input: input.clone(),
                _eviction: eviction,
            },
        );
        input
    }

    pub fn get(&self, resource: &Resource) -> Option<CachedEditorInput> {
        let key = self.identity.canonicalize(resource);
        self.entries
            .borrow()
            .get(&key)
            .map(|entry| entry.input.clone())
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        self.get(resource).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Dispose every cached input and empty the cache.
    pub fn dispose_all(&self) {
        let drained: Vec<CacheEntry> = self
            .entries
            .borrow_mut()
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        for CacheEntry {
            input,
            _eviction: eviction,
        } in drained
        {
            drop(eviction);
            input.handle().dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use wbe_source::PathCasing;

    use super::*;
    use crate::input::EditorInput;

    fn cache(casing: PathCasing) -> EditorInputCache {
        EditorInputCache::new(Rc::new(UriIdentity::new(casing)))
    }

    fn resource_input(resource: &Resource) -> CachedEditorInput {
        CachedEditorInput::Resource(ResourceEditorInput::new(resource.clone()))
    }

    fn resource(s: &str) -> Resource {
        Resource::parse(s).unwrap()
    }

    #[test]
    fn test_hit_returns_same_instance() {
        let cache = cache(PathCasing::Sensitive);
        let uri = resource("git:/proj/a.ts");
        let first = cache.get_or_create(&uri, || resource_input(&uri), |_| {});
        let second = cache.get_or_create(
            &uri,
            || panic!("must not create on a hit"),
            |_| {},
        );
        assert_eq!(first.handle().id(), second.handle().id());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_case_variants_share_an_entry_when_insensitive() {
        let cache = cache(PathCasing::Insensitive);
        let upper = resource("file:///Proj/A.ts");
        let lower = resource("file:///proj/a.ts");
        let first = cache.get_or_create(&upper, || resource_input(&upper), |_| {});
        let second = cache.get_or_create(&lower, || resource_input(&lower), |_| {});
        assert_eq!(first.handle().id(), second.handle().id());
    }

    #[test]
    fn test_dispose_evicts() {
        let cache = cache(PathCasing::Sensitive);
        let uri = resource("git:/proj/a.ts");
        let first = cache.get_or_create(&uri, || resource_input(&uri), |_| {});
        first.handle().dispose();
        assert!(cache.is_empty());

        let second = cache.get_or_create(&uri, || resource_input(&uri), |_| {});
        assert_ne!(first.handle().id(), second.handle().id());
    }

    #[test]
    fn test_dispose_all_disposes_and_empties() {
        let cache = cache(PathCasing::Sensitive);
        let a = resource("git:/a");
        let b = resource("git:/b");
        let a = cache.get_or_create(&a, || resource_input(&a), |_| {}).handle();
        let b = cache.get_or_create(&b, || resource_input(&b), |_| {}).handle();

        cache.dispose_all();
        assert!(cache.is_empty());
        assert!(a.is_disposed());
        assert!(b.is_disposed());
    }
}
