use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use wbe_source::Resource;

use super::Capabilities;
use super::EditorId;
use super::EditorInput;
use super::RevertOptions;
use super::SaveOptions;
use super::SavedEditor;
use crate::dispose::DisposeEmitter;
use crate::dispose::Subscription;
use crate::group::GroupId;

pub const RESOURCE_EDITOR_TYPE_ID: &str = "workbench.editors.resourceEditorInput";

#[derive(Clone, Debug, Default)]
struct Presentation {
    name: Option<String>,
    description: Option<String>,
    mode: Option<String>,
    contents: Option<String>,
}

/// A read-only editor on a resource no file service handles.
pub struct ResourceEditorInput {
    id: EditorId,
    resource: Resource,
    presentation: RefCell<Presentation>,
    will_dispose: DisposeEmitter,
}

impl ResourceEditorInput {
    pub fn new(resource: Resource) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::next(),
            resource,
            presentation: RefCell::new(Presentation::default()),
            will_dispose: DisposeEmitter::new(),
        })
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.presentation.borrow_mut().name = Some(name.into());
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.presentation.borrow_mut().description = Some(description.into());
    }

    pub fn set_mode(&self, mode: impl Into<String>) {
        self.presentation.borrow_mut().mode = Some(mode.into());
    }

    pub fn set_contents(&self, contents: impl Into<String>) {
        self.presentation.borrow_mut().contents = Some(contents.into());
    }

    pub fn mode(&self) -> Option<String> {
        self.presentation.borrow().mode.clone()
    }

    pub fn contents(&self) -> Option<String> {
        self.presentation.borrow().contents.clone()
    }
}

#[async_trait(?Send)]
impl EditorInput for ResourceEditorInput {
    fn id(&self) -> EditorId {
        self.id
    }

    fn type_id(&self) -> &'static str {
        RESOURCE_EDITOR_TYPE_ID
    }

    fn resource(&self) -> Option<Resource> {
        Some(self.resource.clone())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READONLY
    }

    fn name(&self) -> String {
        self.presentation
            .borrow()
            .name
            .clone()
            .unwrap_or_else(|| self.resource.basename())
    }

    fn description(&self) -> Option<String> {
        self.presentation.borrow().description.clone()
    }

    fn is_disposed(&self) -> bool {
        self.will_dispose.has_fired()
    }

    fn matches(&self, other: &dyn EditorInput) -> bool {
        other.id() == self.id
            || (other.type_id() == RESOURCE_EDITOR_TYPE_ID
                && other.resource().as_ref() == Some(&self.resource))
    }

    // Read-only: there is never anything to write.
    async fn save(&self, _group: GroupId, _options: &SaveOptions) -> Option<SavedEditor> {
        Some(SavedEditor::Same)
    }

    async fn save_as(&self, _group: GroupId, _options: &SaveOptions) -> Option<SavedEditor> {
        None
    }

    async fn revert(&self, _group: GroupId, _options: &RevertOptions) -> bool {
        true
    }

    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription {
        self.will_dispose.subscribe(listener)
    }

    fn dispose(&self) {
        self.will_dispose.fire();
    }
}

impl fmt::Debug for ResourceEditorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEditorInput")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
