use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use wbe_source::Resource;

use super::on_dispose;
use super::EditorHandle;
use super::EditorId;
use super::EditorInput;
use super::RevertOptions;
use super::SaveOptions;
use super::SavedEditor;
use crate::dispose::DisposeEmitter;
use crate::dispose::Subscription;
use crate::group::GroupId;

pub const DIFF_EDITOR_TYPE_ID: &str = "workbench.editors.diffEditorInput";

/// Two editors compared side by side.
///
/// Never cached. The sides usually are cached inputs shared with plain
/// editors; when either side is disposed the diff disposes itself, but
/// disposing the diff leaves both sides alone.
pub struct DiffEditorInput {
    id: EditorId,
    label: Option<String>,
    description: Option<String>,
    original: EditorHandle,
    modified: EditorHandle,
    will_dispose: DisposeEmitter,
    _sides: [Subscription; 2],
}

impl DiffEditorInput {
    pub fn new(
        label: Option<String>,
        description: Option<String>,
        original: EditorHandle,
        modified: EditorHandle,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &std::rc::Weak<Self>| {
            let follow = |side: &EditorHandle| {
                let this = this.clone();
                on_dispose(side.as_ref(), move || {
                    if let Some(diff) = this.upgrade() {
                        diff.dispose();
                    }
                })
            };
            let sides = [follow(&original), follow(&modified)];
            Self {
                id: EditorId::next(),
                label,
                description,
                original,
                modified,
                will_dispose: DisposeEmitter::new(),
                _sides: sides,
            }
        })
    }

    pub fn original(&self) -> &EditorHandle {
        &self.original
    }

    pub fn modified(&self) -> &EditorHandle {
        &self.modified
    }
}

#[async_trait(?Send)]
impl EditorInput for DiffEditorInput {
    fn id(&self) -> EditorId {
        self.id
    }

    fn type_id(&self) -> &'static str {
        DIFF_EDITOR_TYPE_ID
    }

    fn resource(&self) -> Option<Resource> {
        None
    }

    fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            format!("{} ↔ {}", self.original.name(), self.modified.name())
        })
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn is_dirty(&self) -> bool {
        self.modified.is_dirty()
    }

    fn is_disposed(&self) -> bool {
        self.will_dispose.has_fired()
    }

    fn matches(&self, other: &dyn EditorInput) -> bool {
        if other.id() == self.id {
            return true;
        }
        match other.sides() {
            Some((original, modified)) if other.type_id() == DIFF_EDITOR_TYPE_ID => {
                self.original.matches(original.as_ref())
                    && self.modified.matches(modified.as_ref())
            }
            _ => false,
        }
    }

    fn sides(&self) -> Option<(EditorHandle, EditorHandle)> {
        Some((self.original.clone(), self.modified.clone()))
    }

    async fn save(&self, group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        self.modified.save(group, options).await
    }

    async fn save_as(&self, group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        self.modified.save_as(group, options).await
    }

    async fn revert(&self, group: GroupId, options: &RevertOptions) -> bool {
        self.modified.revert(group, options).await
    }

    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription {
        self.will_dispose.subscribe(listener)
    }

    fn dispose(&self) {
        self.will_dispose.fire();
    }
}

impl fmt::Debug for DiffEditorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEditorInput")
            .field("id", &self.id)
            .field("original", &self.original)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}
