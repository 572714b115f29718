//! Editor groups: the containers editors are opened in.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use wbe_source::Resource;

use crate::dispose::Subscription;
use crate::input::EditorHandle;
use crate::input::EditorInput;
use crate::options::EditorOptions;
use crate::options::ViewState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

pub type GroupHandle = Rc<dyn EditorGroup>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorsOrder {
    /// Visual order within the group.
    Sequential,
    MostRecentlyActive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupsOrder {
    CreationTime,
    MostRecentlyActive,
}

/// Where the caller would like an editor to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferredGroup {
    Active,
    /// Next to the active group.
    Side,
    Group(GroupId),
}

/// An editor together with the group it is open in.
#[derive(Clone, Debug)]
pub struct EditorIdentifier {
    pub group: GroupId,
    pub editor: EditorHandle,
}

/// The result of opening an editor.
#[derive(Clone, Debug)]
pub struct EditorPane {
    pub group: GroupId,
    pub editor: EditorHandle,
    pub view_state: Option<ViewState>,
}

#[derive(Clone, Debug)]
pub struct EditorWithOptions {
    pub editor: EditorHandle,
    pub options: Option<EditorOptions>,
}

/// A typed replacement inside one group.
#[derive(Clone, Debug)]
pub struct EditorReplacement {
    pub editor: EditorHandle,
    pub replacement: EditorHandle,
    pub options: Option<EditorOptions>,
}

/// One group of editors.
#[async_trait(?Send)]
pub trait EditorGroup {
    fn id(&self) -> GroupId;

    fn editors(&self, order: EditorsOrder) -> Vec<EditorHandle>;

    fn active_editor(&self) -> Option<EditorHandle>;

    fn count(&self) -> usize {
        self.editors(EditorsOrder::Sequential).len()
    }

    fn contains(&self, editor: &dyn EditorInput) -> bool {
        self.index_of(editor).is_some()
    }

    fn find_editors(&self, resource: &Resource) -> Vec<EditorHandle> {
        self.editors(EditorsOrder::Sequential)
            .into_iter()
            .filter(|editor| editor.resource().as_ref() == Some(resource))
            .collect()
    }

    fn index_of(&self, editor: &dyn EditorInput) -> Option<usize>;

    fn is_pinned(&self, editor: &dyn EditorInput) -> bool;

    fn is_sticky(&self, editor: &dyn EditorInput) -> bool;

    /// Whether `editor` is this group's active editor.
    fn is_active(&self, editor: &dyn EditorInput) -> bool {
        self.active_editor()
            .is_some_and(|active| active.matches(editor))
    }

    fn pin_editor(&self, editor: &dyn EditorInput);

    async fn open_editor(
        &self,
        editor: EditorHandle,
        options: Option<EditorOptions>,
    ) -> Option<EditorPane>;

    /// Open several editors in one go. Returns the pane of the editor that
    /// ended up active.
    async fn open_editors(&self, editors: Vec<EditorWithOptions>) -> Option<EditorPane>;

    async fn replace_editors(&self, replacements: Vec<EditorReplacement>);
}

/// The set of groups editors can be opened in.
#[async_trait(?Send)]
pub trait EditorGroups {
    fn groups(&self, order: GroupsOrder) -> Vec<GroupHandle>;

    fn group(&self, id: GroupId) -> Option<GroupHandle>;

    fn active_group(&self) -> GroupHandle;

    /// The group used for "open to the side", created when there is none.
    fn side_group(&self) -> GroupHandle;

    /// Resolves once groups are restored and usable.
    async fn when_ready(&self) {}

    /// Call `listener` whenever the editors shown across groups may have
    /// changed: opens, closes, replacements and group activation.
    fn on_did_visible_editors_change(&self, listener: Box<dyn Fn()>) -> Subscription;
}
