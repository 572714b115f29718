//! Editor inputs: the document-side object an editor shows.
//!
//! Inputs are shared through [`EditorHandle`]s. Identity is the
//! [`EditorId`]; two distinct instances may still [`matches`](EditorInput::matches)
//! each other when they show the same document.

mod diff;
mod file;
mod resource;
mod untitled;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use bitflags::bitflags;
use wbe_source::Resource;

pub use self::diff::DiffEditorInput;
pub use self::diff::DIFF_EDITOR_TYPE_ID;
pub use self::file::FileEditorInput;
pub use self::file::PreferredMetadata;
pub use self::file::FILE_EDITOR_TYPE_ID;
pub use self::resource::ResourceEditorInput;
pub use self::resource::RESOURCE_EDITOR_TYPE_ID;
pub use self::untitled::UntitledEditorInput;
pub use self::untitled::UNTITLED_EDITOR_TYPE_ID;
use crate::dispose::Subscription;
use crate::group::GroupId;
use crate::options::EditorOptions;
use crate::request::EditorRequest;
use crate::request::UntypedEditor;

pub type EditorHandle = Rc<dyn EditorInput>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const READONLY = 1 << 1;
        /// Has no backing file yet; saving it means choosing a target.
        const UNTITLED = 1 << 2;
        const SINGLETON = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveReason {
    /// The user asked for it.
    #[default]
    Explicit,
    Auto,
    FocusChange,
    WindowChange,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub reason: SaveReason,
    /// Always ask for a new target, even when the editor has one.
    pub save_as: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevertOptions {
    /// Revert even when the editor is not dirty.
    pub force: bool,
    /// Only mark as not dirty without reloading contents.
    pub soft: bool,
}

/// What a successful save produced.
#[derive(Clone, Debug)]
pub enum SavedEditor {
    /// Saved in place; the editor stays.
    Same,
    /// Saved into a different, already constructed editor.
    Editor(EditorHandle),
    /// Saved to a different location; the editor for it still has to be built.
    Untyped(UntypedEditor),
}

/// The result of asking an editor to follow its document to a new location.
#[derive(Clone, Debug)]
pub struct MoveResult {
    pub editor: EditorRequest,
    pub options: Option<EditorOptions>,
}

/// A document-side object that can be opened in an editor group.
#[async_trait(?Send)]
pub trait EditorInput: fmt::Debug {
    fn id(&self) -> EditorId;

    /// Stable identifier of the input kind.
    fn type_id(&self) -> &'static str;

    /// The document this input shows, if it shows exactly one.
    fn resource(&self) -> Option<Resource>;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    fn name(&self) -> String;

    fn description(&self) -> Option<String> {
        None
    }

    fn is_dirty(&self) -> bool {
        false
    }

    fn is_disposed(&self) -> bool;

    /// Whether `other` shows the same thing as this input.
    fn matches(&self, other: &dyn EditorInput) -> bool {
        self.id() == other.id()
    }

    /// `(original, modified)` for inputs that show two documents side by side.
    fn sides(&self) -> Option<(EditorHandle, EditorHandle)> {
        None
    }

    /// Describe the editor that should replace this one after its document
    /// moved to `target`. `None` when the input cannot follow a move.
    fn rename(&self, _group: GroupId, _target: &Resource) -> Option<MoveResult> {
        None
    }

    /// `None` means the save was cancelled or failed.
    async fn save(&self, group: GroupId, options: &SaveOptions) -> Option<SavedEditor>;

    async fn save_as(&self, group: GroupId, options: &SaveOptions) -> Option<SavedEditor>;

    async fn revert(&self, group: GroupId, options: &RevertOptions) -> bool;

    /// Run `listener` right before the input is disposed.
    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription;

    /// Notify will-dispose listeners and release the input. Idempotent.
    fn dispose(&self);
}

/// Shorthand for a listener on `editor`'s disposal.
pub(crate) fn on_dispose(
    editor: &dyn EditorInput,
    listener: impl FnOnce() + 'static,
) -> Subscription {
    editor.on_will_dispose(Box::new(listener))
}
