//! Editor overrides: letting a third party decide which editor opens.

use async_trait::async_trait;

use crate::group::GroupId;
use crate::group::PreferredGroup;
use crate::input::EditorHandle;
use crate::options::EditorActivation;
use crate::options::EditorOptions;
use crate::request::EditorRequest;

#[derive(Clone, Debug)]
pub struct ResolvedOpen {
    pub editor: EditorHandle,
    /// Replace the caller's options when set.
    pub options: Option<EditorOptions>,
    pub group: Option<GroupId>,
    pub activation: Option<EditorActivation>,
}

#[derive(Clone, Debug)]
pub enum ResolvedEditor {
    /// Nothing registered for this request; build the default editor.
    NotApplicable,
    /// Stop the open altogether.
    Abort,
    Resolved(ResolvedOpen),
}

#[async_trait(?Send)]
pub trait EditorResolver {
    async fn resolve_editor(
        &self,
        request: &EditorRequest,
        options: Option<&EditorOptions>,
        preferred: Option<PreferredGroup>,
    ) -> ResolvedEditor;
}

/// A resolver with no overrides registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOverrides;

#[async_trait(?Send)]
impl EditorResolver for NoOverrides {
    async fn resolve_editor(
        &self,
        _request: &EditorRequest,
        _options: Option<&EditorOptions>,
        _preferred: Option<PreferredGroup>,
    ) -> ResolvedEditor {
        ResolvedEditor::NotApplicable
    }
}
