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
use crate::request::UntypedEditor;
use crate::services::UntitledModel;

pub const UNTITLED_EDITOR_TYPE_ID: &str = "workbench.editors.untitledEditorInput";

/// An editor on an in-memory buffer without a backing file.
///
/// Owns its model: disposing the input disposes the model.
pub struct UntitledEditorInput {
    id: EditorId,
    model: Rc<dyn UntitledModel>,
    will_dispose: DisposeEmitter,
}

impl UntitledEditorInput {
    pub fn new(model: Rc<dyn UntitledModel>) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::next(),
            model,
            will_dispose: DisposeEmitter::new(),
        })
    }

    pub fn model(&self) -> &Rc<dyn UntitledModel> {
        &self.model
    }

    async fn save_model(&self, options: &SaveOptions) -> Option<SavedEditor> {
        let target = self.model.save(options).await?;
        Some(SavedEditor::Untyped(UntypedEditor::resource(target)))
    }
}

#[async_trait(?Send)]
impl EditorInput for UntitledEditorInput {
    fn id(&self) -> EditorId {
        self.id
    }

    fn type_id(&self) -> &'static str {
        UNTITLED_EDITOR_TYPE_ID
    }

    fn resource(&self) -> Option<Resource> {
        Some(self.model.resource())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UNTITLED
    }

    fn name(&self) -> String {
        self.model.name()
    }

    fn description(&self) -> Option<String> {
        self.model
            .associated_resource()
            .map(|resource| resource.to_string())
    }

    fn is_dirty(&self) -> bool {
        self.model.is_dirty()
    }

    fn is_disposed(&self) -> bool {
        self.will_dispose.has_fired()
    }

    fn matches(&self, other: &dyn EditorInput) -> bool {
        other.id() == self.id
            || (other.type_id() == UNTITLED_EDITOR_TYPE_ID
                && other.resource() == Some(self.model.resource()))
    }

    async fn save(&self, _group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        self.save_model(options).await
    }

    async fn save_as(&self, _group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        self.save_model(options).await
    }

    async fn revert(&self, _group: GroupId, _options: &RevertOptions) -> bool {
        self.model.revert().await
    }

    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription {
        self.will_dispose.subscribe(listener)
    }

    fn dispose(&self) {
        if self.will_dispose.fire() {
            self.model.dispose();
        }
    }
}

impl fmt::Debug for UntitledEditorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntitledEditorInput")
            .field("id", &self.id)
            .field("resource", &self.model.resource())
            .finish_non_exhaustive()
    }
}
