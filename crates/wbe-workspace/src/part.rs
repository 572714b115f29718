//! An in-memory implementation of editor groups.
//!
//! Groups keep editors in visual order plus a most-recently-active list.
//! An editor is disposed when it is closed or replaced in its last group, and
//! leaves every group as soon as it is disposed from anywhere else.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;

use async_trait::async_trait;

use crate::dispose::ChangeEmitter;
use crate::dispose::Subscription;
use crate::group::EditorGroup;
use crate::group::EditorGroups;
use crate::group::EditorPane;
use crate::group::EditorReplacement;
use crate::group::EditorWithOptions;
use crate::group::EditorsOrder;
use crate::group::GroupHandle;
use crate::group::GroupId;
use crate::group::GroupsOrder;
use crate::input::on_dispose;
use crate::input::EditorHandle;
use crate::input::EditorId;
use crate::input::EditorInput;
use crate::options::EditorActivation;
use crate::options::EditorOptions;
use crate::options::ViewState;

pub struct EditorPart {
    this: Weak<EditorPart>,
    groups: RefCell<Vec<Rc<EditorGroupModel>>>,
    /// Most recently active first.
    recency: RefCell<Vec<GroupId>>,
    active: Cell<GroupId>,
    next_id: Cell<u32>,
    visible_change: ChangeEmitter,
}

impl EditorPart {
    /// A part with a single, active group.
    pub fn new() -> Rc<Self> {
        let part = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            groups: RefCell::default(),
            recency: RefCell::default(),
            active: Cell::new(GroupId(1)),
            next_id: Cell::new(1),
            visible_change: ChangeEmitter::new(),
        });
        let first = part.add_group();
        part.activate_group(first.id());
        part
    }

    /// Append a new group. It does not become active.
    pub fn add_group(&self) -> Rc<EditorGroupModel> {
        let id = GroupId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let group = Rc::new_cyclic(|this| EditorGroupModel {
            id,
            this: this.clone(),
            part: self.this.clone(),
            state: RefCell::default(),
        });
        self.groups.borrow_mut().push(group.clone());
        self.recency.borrow_mut().push(id);
        tracing::debug!(group = %id, "added editor group");
        group
    }

    pub fn model(&self, id: GroupId) -> Option<Rc<EditorGroupModel>> {
        self.groups
            .borrow()
            .iter()
            .find(|group| group.id == id)
            .cloned()
    }

    pub fn activate_group(&self, id: GroupId) {
        if self.model(id).is_none() {
            return;
        }
        self.active.set(id);
        {
            let mut recency = self.recency.borrow_mut();
            recency.retain(|group| *group != id);
            recency.insert(0, id);
        }
        self.visible_change.fire();
    }

    fn visible_editors_changed(&self) {
        self.visible_change.fire();
    }

    /// Whether this exact editor instance is open in any group.
    fn holds(&self, id: EditorId) -> bool {
        let groups = self.groups.borrow().clone();
        groups.iter().any(|group| group.holds(id))
    }
}

#[async_trait(?Send)]
impl EditorGroups for EditorPart {
    fn groups(&self, order: GroupsOrder) -> Vec<GroupHandle> {
        let groups = self.groups.borrow();
        match order {
            GroupsOrder::CreationTime => groups
                .iter()
                .map(|group| group.clone() as GroupHandle)
                .collect(),
            GroupsOrder::MostRecentlyActive => self
                .recency
                .borrow()
                .iter()
                .filter_map(|id| groups.iter().find(|group| group.id == *id))
                .map(|group| group.clone() as GroupHandle)
                .collect(),
        }
    }

    fn group(&self, id: GroupId) -> Option<GroupHandle> {
        self.model(id).map(|group| group as GroupHandle)
    }

    fn active_group(&self) -> GroupHandle {
        let groups = self.groups.borrow();
        let active = self.active.get();
        groups
            .iter()
            .find(|group| group.id == active)
            .unwrap_or(&groups[0])
            .clone()
    }

    fn side_group(&self) -> GroupHandle {
        let active = self.active.get();
        let existing = self
            .groups
            .borrow()
            .iter()
            .find(|group| group.id != active)
            .cloned();
        existing.unwrap_or_else(|| self.add_group())
    }

    fn on_did_visible_editors_change(&self, listener: Box<dyn Fn()>) -> Subscription {
        self.visible_change.subscribe(listener)
    }
}

struct GroupEntry {
    editor: EditorHandle,
    pinned: bool,
    sticky: bool,
    view_state: Option<ViewState>,
    _on_dispose: Subscription,
}

#[derive(Default)]
struct GroupState {
    entries: Vec<GroupEntry>,
    /// Most recently active first.
    recency: Vec<EditorId>,
    active: Option<EditorId>,
}

impl GroupState {
    fn position(&self, editor: &dyn EditorInput) -> Option<usize> {
        self.position_of_id(editor.id()).or_else(|| {
            self.entries
                .iter()
                .position(|entry| entry.editor.matches(editor))
        })
    }

    fn position_of_id(&self, id: EditorId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.editor.id() == id)
    }

    fn entry(&self, editor: &dyn EditorInput) -> Option<&GroupEntry> {
        self.position(editor).map(|index| &self.entries[index])
    }

    fn touch(&mut self, id: EditorId) {
        self.recency.retain(|editor| *editor != id);
        self.recency.insert(0, id);
    }

    fn remove_at(&mut self, index: usize) -> GroupEntry {
        let entry = self.entries.remove(index);
        let id = entry.editor.id();
        self.recency.retain(|editor| *editor != id);
        if self.active == Some(id) {
            self.active = self.recency.first().copied();
        }
        entry
    }
}

pub struct EditorGroupModel {
    id: GroupId,
    this: Weak<EditorGroupModel>,
    part: Weak<EditorPart>,
    state: RefCell<GroupState>,
}

impl EditorGroupModel {
    /// Close `editor`, disposing it unless another group still has it.
    pub fn close_editor(&self, editor: &dyn EditorInput) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.position(editor) else {
                return false;
            };
            state.remove_at(index)
        };
        tracing::debug!(group = %self.id, editor = %removed.editor.id(), "closed editor");
        self.release(removed);
        self.visible_editors_changed();
        true
    }

    fn holds(&self, id: EditorId) -> bool {
        self.state.borrow().position_of_id(id).is_some()
    }

    fn entry_for(&self, editor: EditorHandle, options: &EditorOptions) -> GroupEntry {
        let group = self.this.clone();
        let id = editor.id();
        let subscription = on_dispose(editor.as_ref(), move || {
            if let Some(group) = group.upgrade() {
                group.forget(id);
            }
        });
        GroupEntry {
            editor,
            pinned: options.is_pinned(),
            sticky: options.is_sticky(),
            view_state: options.view_state.clone(),
            _on_dispose: subscription,
        }
    }

    fn visible_editors_changed(&self) {
        if let Some(part) = self.part.upgrade() {
            part.visible_editors_changed();
        }
    }

    /// Drop an editor that was disposed elsewhere.
    fn forget(&self, id: EditorId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.position_of_id(id).map(|index| state.remove_at(index))
        };
        if removed.is_some() {
            tracing::debug!(group = %self.id, editor = %id, "removed disposed editor");
            drop(removed);
            self.visible_editors_changed();
        }
    }

    /// Dispose a removed editor unless it is still open somewhere.
    fn release(&self, entry: GroupEntry) {
        let GroupEntry {
            editor,
            _on_dispose: subscription,
            ..
        } = entry;
        drop(subscription);
        let still_open = self
            .part
            .upgrade()
            .is_some_and(|part| part.holds(editor.id()));
        if !still_open {
            editor.dispose();
        }
    }

    fn open(&self, editor: EditorHandle, options: &EditorOptions) -> Option<EditorPane> {
        if editor.is_disposed() {
            tracing::debug!(group = %self.id, editor = %editor.id(), "not opening disposed editor");
            return None;
        }

        let pane = {
            let mut state = self.state.borrow_mut();
            let index = match state.position(editor.as_ref()) {
                Some(current) => {
                    let mut entry = state.entries.remove(current);
                    entry.pinned |= options.is_pinned();
                    if let Some(sticky) = options.sticky {
                        entry.sticky = sticky;
                    }
                    if let Some(view_state) = &options.view_state {
                        entry.view_state = Some(view_state.clone());
                    }
                    let index = options.index.unwrap_or(current).min(state.entries.len());
                    state.entries.insert(index, entry);
                    index
                }
                None => {
                    let after_active = state
                        .active
                        .and_then(|id| state.position_of_id(id))
                        .map_or(state.entries.len(), |index| index + 1);
                    let index = options
                        .index
                        .unwrap_or(after_active)
                        .min(state.entries.len());
                    let entry = self.entry_for(editor, options);
                    state.entries.insert(index, entry);
                    index
                }
            };

            let entry = &state.entries[index];
            let pane = EditorPane {
                group: self.id,
                editor: entry.editor.clone(),
                view_state: entry.view_state.clone(),
            };
            let id = entry.editor.id();
            if !options.is_inactive() || state.active.is_none() {
                state.active = Some(id);
                state.touch(id);
            } else if !state.recency.contains(&id) {
                state.recency.push(id);
            }
            pane
        };

        let activate = match options.activation {
            Some(EditorActivation::Activate) => true,
            Some(EditorActivation::Restore | EditorActivation::Preserve) => false,
            None => !options.preserves_focus() && !options.is_inactive(),
        };
        if let Some(part) = self.part.upgrade() {
            if activate {
                part.activate_group(self.id);
            } else {
                part.visible_editors_changed();
            }
        }
        Some(pane)
    }

    fn replace(&self, replacements: Vec<EditorReplacement>) {
        let mut released = Vec::new();
        let mut replaced = false;
        {
            let mut state = self.state.borrow_mut();
            for EditorReplacement {
                editor,
                replacement,
                options,
            } in replacements
            {
                let Some(index) = state.position(editor.as_ref()) else {
                    continue;
                };
                if replacement.is_disposed() {
                    continue;
                }
                let options = options.unwrap_or_default();
                let old = state.entries.remove(index);
                let old_id = old.editor.id();
                let new_id = replacement.id();
                let was_active = state.active == Some(old_id);

                if let Some(duplicate) = state.position_of_id(new_id) {
                    let duplicate = state.remove_at(duplicate);
                    drop(duplicate);
                }

                let mut entry = self.entry_for(replacement, &options);
                entry.pinned = options.pinned.unwrap_or(old.pinned);
                entry.sticky = options.sticky.unwrap_or(old.sticky);
                if entry.view_state.is_none() {
                    entry.view_state.clone_from(&old.view_state);
                }
                let index = options.index.unwrap_or(index).min(state.entries.len());
                state.entries.insert(index, entry);

                for id in &mut state.recency {
                    if *id == old_id {
                        *id = new_id;
                    }
                }
                if !state.recency.contains(&new_id) {
                    state.recency.push(new_id);
                }
                if was_active || state.active.is_none() {
                    state.active = Some(new_id);
                }

                replaced = true;
                if old_id != new_id {
                    released.push(old);
                }
            }
        }
        for entry in released {
            self.release(entry);
        }
        if replaced {
            self.visible_editors_changed();
        }
    }
}

#[async_trait(?Send)]
impl EditorGroup for EditorGroupModel {
    fn id(&self) -> GroupId {
        self.id
    }

    fn editors(&self, order: EditorsOrder) -> Vec<EditorHandle> {
        let state = self.state.borrow();
        match order {
            EditorsOrder::Sequential => state
                .entries
                .iter()
                .map(|entry| entry.editor.clone())
                .collect(),
            EditorsOrder::MostRecentlyActive => state
                .recency
                .iter()
                .filter_map(|id| state.position_of_id(*id))
                .map(|index| state.entries[index].editor.clone())
                .collect(),
        }
    }

    fn active_editor(&self) -> Option<EditorHandle> {
        let state = self.state.borrow();
        let index = state.position_of_id(state.active?)?;
        Some(state.entries[index].editor.clone())
    }

    fn index_of(&self, editor: &dyn EditorInput) -> Option<usize> {
        self.state.borrow().position(editor)
    }

    fn is_pinned(&self, editor: &dyn EditorInput) -> bool {
        self.state
            .borrow()
            .entry(editor)
            .is_some_and(|entry| entry.pinned)
    }

    fn is_sticky(&self, editor: &dyn EditorInput) -> bool {
        self.state
            .borrow()
            .entry(editor)
            .is_some_and(|entry| entry.sticky)
    }

    fn pin_editor(&self, editor: &dyn EditorInput) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.position(editor) {
            state.entries[index].pinned = true;
        }
    }

    async fn open_editor(
        &self,
        editor: EditorHandle,
        options: Option<EditorOptions>,
    ) -> Option<EditorPane> {
        self.open(editor, &options.unwrap_or_default())
    }

    async fn open_editors(&self, editors: Vec<EditorWithOptions>) -> Option<EditorPane> {
        let mut active = None;
        let mut last = None;
        for EditorWithOptions { editor, options } in editors {
            let mut options = options.unwrap_or_default();
            if active.is_some() {
                options.inactive = Some(true);
            }
            let inactive = options.is_inactive();
            let pane = self.open(editor, &options);
            if !inactive && active.is_none() {
                active.clone_from(&pane);
            }
            last = pane.or(last);
        }
        active.or(last)
    }

    async fn replace_editors(&self, replacements: Vec<EditorReplacement>) {
        self.replace(replacements);
    }
}
