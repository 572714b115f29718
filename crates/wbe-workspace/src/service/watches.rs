//! File watches for visible editors that show documents outside the
//! workspace.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use wbe_source::Resource;
use wbe_source::UriIdentity;

use crate::dispose::Subscription;
use crate::group::EditorGroups;
use crate::group::GroupsOrder;
use crate::input::EditorHandle;
use crate::services::FileService;
use crate::services::WorkspaceFolders;

/// The active editor of every group that has one.
pub(super) fn visible_editors(groups: &dyn EditorGroups) -> Vec<EditorHandle> {
    groups
        .groups(GroupsOrder::CreationTime)
        .iter()
        .filter_map(|group| group.active_editor())
        .collect()
}

pub(super) struct OutsideWatches {
    groups: Rc<dyn EditorGroups>,
    files: Rc<dyn FileService>,
    workspace: WorkspaceFolders,
    identity: Rc<UriIdentity>,
    watchers: RefCell<FxHashMap<Resource, Subscription>>,
}

impl OutsideWatches {
    pub(super) fn new(
        groups: Rc<dyn EditorGroups>,
        files: Rc<dyn FileService>,
        workspace: WorkspaceFolders,
        identity: Rc<UriIdentity>,
    ) -> Self {
        Self {
            groups,
            files,
            workspace,
            identity,
            watchers: RefCell::default(),
        }
    }

    /// Watched resources, sorted.
    pub(super) fn resources(&self) -> Vec<Resource> {
        let mut watched: Vec<Resource> = self.watchers.borrow().keys().cloned().collect();
        watched.sort();
        watched
    }

    /// Watch what visible editors outside the workspace show, and stop
    /// watching everything else.
    pub(super) fn refresh(&self) {
        let mut visible = IndexSet::new();
        for editor in visible_editors(self.groups.as_ref()) {
            let shown: Vec<Resource> = match editor.sides() {
                Some((original, modified)) => {
                    original.resource().into_iter().chain(modified.resource()).collect()
                }
                None => editor.resource().into_iter().collect(),
            };
            for resource in shown {
                let resource = self.identity.canonicalize(&resource);
                if self.files.can_handle_resource(&resource)
                    && !self.workspace.contains(&self.identity, &resource)
                {
                    visible.insert(resource);
                }
            }
        }

        let stale: Vec<_> = {
            let mut watchers = self.watchers.borrow_mut();
            let gone: Vec<Resource> = watchers
                .keys()
                .filter(|resource| !visible.contains(*resource))
                .cloned()
                .collect();
            gone.into_iter()
                .filter_map(|resource| watchers.remove_entry(&resource))
                .collect()
        };
        for (resource, watch) in stale {
            tracing::debug!(resource = %resource, "no longer visible, stopping watch");
            drop(watch);
        }

        for resource in visible {
            if self.watchers.borrow().contains_key(&resource) {
                continue;
            }
            let watch = self.files.watch(&resource);
            self.watchers.borrow_mut().insert(resource, watch);
        }
    }

    pub(super) fn clear(&self) {
        let watchers: Vec<Subscription> = self
            .watchers
            .borrow_mut()
            .drain()
            .map(|(_, watch)| watch)
            .collect();
        drop(watchers);
    }
}
