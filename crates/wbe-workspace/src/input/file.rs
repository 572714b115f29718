use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use wbe_source::Resource;

use super::EditorId;
use super::EditorInput;
use super::MoveResult;
use super::RevertOptions;
use super::SaveOptions;
use super::SavedEditor;
use crate::dispose::DisposeEmitter;
use crate::dispose::Subscription;
use crate::group::GroupId;
use crate::request::EditorRequest;
use crate::request::UntypedEditor;
use crate::services::WorkingCopyService;

pub const FILE_EDITOR_TYPE_ID: &str = "workbench.editors.files.fileEditorInput";

/// Presentation details requested by whoever opened the editor last.
///
/// The `resource` here keeps the caller's spelling, which may differ from the
/// canonical resource the input is keyed by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferredMetadata {
    pub resource: Resource,
    pub name: Option<String>,
    pub description: Option<String>,
    pub encoding: Option<String>,
    pub mode: Option<String>,
    pub contents: Option<String>,
}

impl PreferredMetadata {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            name: None,
            description: None,
            encoding: None,
            mode: None,
            contents: None,
        }
    }
}

/// An editor on a file the file service can handle.
pub struct FileEditorInput {
    id: EditorId,
    resource: Resource,
    preferred: RefCell<PreferredMetadata>,
    working_copies: Rc<dyn WorkingCopyService>,
    will_dispose: DisposeEmitter,
}

impl FileEditorInput {
    pub fn new(
        resource: Resource,
        preferred: PreferredMetadata,
        working_copies: Rc<dyn WorkingCopyService>,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::next(),
            resource,
            preferred: RefCell::new(preferred),
            working_copies,
            will_dispose: DisposeEmitter::new(),
        })
    }

    pub fn preferred(&self) -> PreferredMetadata {
        self.preferred.borrow().clone()
    }

    pub fn set_preferred_resource(&self, resource: Resource) {
        self.preferred.borrow_mut().resource = resource;
    }

    pub fn set_preferred_name(&self, name: impl Into<String>) {
        self.preferred.borrow_mut().name = Some(name.into());
    }

    pub fn set_preferred_description(&self, description: impl Into<String>) {
        self.preferred.borrow_mut().description = Some(description.into());
    }

    pub fn set_preferred_encoding(&self, encoding: impl Into<String>) {
        self.preferred.borrow_mut().encoding = Some(encoding.into());
    }

    pub fn set_preferred_mode(&self, mode: impl Into<String>) {
        self.preferred.borrow_mut().mode = Some(mode.into());
    }

    pub fn set_preferred_contents(&self, contents: impl Into<String>) {
        self.preferred.borrow_mut().contents = Some(contents.into());
    }

    /// Apply everything `request` specifies, leaving the rest as it was.
    pub(crate) fn update_preferred(&self, resource: &Resource, request: &UntypedEditor) {
        self.set_preferred_resource(resource.clone());
        if let Some(label) = &request.label {
            self.set_preferred_name(label.clone());
        }
        if let Some(description) = &request.description {
            self.set_preferred_description(description.clone());
        }
        if let Some(encoding) = &request.encoding {
            self.set_preferred_encoding(encoding.clone());
        }
        if let Some(mode) = &request.mode {
            self.set_preferred_mode(mode.clone());
        }
        if let Some(contents) = &request.contents {
            self.set_preferred_contents(contents.clone());
        }
    }
}

#[async_trait(?Send)]
impl EditorInput for FileEditorInput {
    fn id(&self) -> EditorId {
        self.id
    }

    fn type_id(&self) -> &'static str {
        FILE_EDITOR_TYPE_ID
    }

    fn resource(&self) -> Option<Resource> {
        Some(self.resource.clone())
    }

    fn name(&self) -> String {
        let preferred = self.preferred.borrow();
        preferred
            .name
            .clone()
            .unwrap_or_else(|| preferred.resource.basename())
    }

    fn description(&self) -> Option<String> {
        self.preferred.borrow().description.clone()
    }

    fn is_dirty(&self) -> bool {
        self.working_copies.is_dirty(&self.resource)
    }

    fn is_disposed(&self) -> bool {
        self.will_dispose.has_fired()
    }

    fn matches(&self, other: &dyn EditorInput) -> bool {
        other.id() == self.id
            || (other.type_id() == FILE_EDITOR_TYPE_ID
                && other.resource().as_ref() == Some(&self.resource))
    }

    fn rename(&self, _group: GroupId, target: &Resource) -> Option<MoveResult> {
        let preferred = self.preferred.borrow();
        let mut editor = UntypedEditor::resource(target.clone());
        editor.encoding.clone_from(&preferred.encoding);
        editor.mode.clone_from(&preferred.mode);
        Some(MoveResult {
            editor: EditorRequest::Untyped(editor),
            options: None,
        })
    }

    async fn save(&self, _group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        self.working_copies
            .save(&self.resource, options)
            .await
            .then_some(SavedEditor::Same)
    }

    async fn save_as(&self, _group: GroupId, options: &SaveOptions) -> Option<SavedEditor> {
        let target = self.working_copies.save_as(&self.resource, options).await?;
        if target == self.resource {
            return Some(SavedEditor::Same);
        }
        Some(SavedEditor::Untyped(UntypedEditor::resource(target)))
    }

    async fn revert(&self, _group: GroupId, options: &RevertOptions) -> bool {
        self.working_copies.revert(&self.resource, options).await
    }

    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription {
        self.will_dispose.subscribe(listener)
    }

    fn dispose(&self) {
        if self.will_dispose.fire() {
            tracing::trace!(resource = %self.resource, "disposed file editor");
        }
    }
}

impl fmt::Debug for FileEditorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEditorInput")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
