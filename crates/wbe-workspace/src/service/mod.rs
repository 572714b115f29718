//! The editor service: opening, replacing, saving and reconciling editors
//! across groups.

mod reconcile;
mod save;
mod watches;

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use wbe_conf::EditorSettings;
use wbe_source::Resource;
use wbe_source::UriIdentity;

pub use self::save::RevertAllOptions;
pub use self::save::SaveAllOptions;
use self::watches::visible_editors;
use self::watches::OutsideWatches;
use crate::dispose::Subscription;
use crate::error::EditorError;
use crate::factory::EditorFactory;
use crate::group::EditorGroup;
use crate::group::EditorGroups;
use crate::group::EditorIdentifier;
use crate::group::EditorPane;
use crate::group::EditorReplacement;
use crate::group::EditorWithOptions;
use crate::group::EditorsOrder;
use crate::group::GroupHandle;
use crate::group::GroupId;
use crate::group::GroupsOrder;
use crate::group::PreferredGroup;
use crate::input::EditorHandle;
use crate::input::EditorInput;
use crate::options::resolves_overrides;
use crate::options::EditorActivation;
use crate::options::EditorOptions;
use crate::policy::GroupPolicy;
use crate::request::EditorRequest;
use crate::request::OpenRequest;
use crate::request::ReplaceRequest;
use crate::resolver::EditorResolver;
use crate::resolver::ResolvedEditor;
use crate::services::FileService;
use crate::services::HostService;
use crate::services::TrustResponse;
use crate::services::UntitledModels;
use crate::services::WorkingCopyService;
use crate::services::WorkspaceFolders;
use crate::services::WorkspaceTrust;

/// Everything the editor service talks to.
pub struct Collaborators {
    pub groups: Rc<dyn EditorGroups>,
    pub files: Rc<dyn FileService>,
    pub working_copies: Rc<dyn WorkingCopyService>,
    pub untitled: Rc<dyn UntitledModels>,
    pub resolver: Rc<dyn EditorResolver>,
    pub trust: Rc<dyn WorkspaceTrust>,
    pub host: Rc<dyn HostService>,
    pub policy: Rc<dyn GroupPolicy>,
    pub workspace: WorkspaceFolders,
    pub identity: Rc<UriIdentity>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenEditorsOptions {
    /// Ask workspace trust before opening anything.
    pub validate_trust: bool,
}

impl Default for OpenEditorsOptions {
    fn default() -> Self {
        Self {
            validate_trust: true,
        }
    }
}

/// A resolved open: which editor, where, and with which options.
struct OpenTarget {
    editor: EditorHandle,
    group: GroupHandle,
    options: Option<EditorOptions>,
}

pub struct EditorService {
    groups: Rc<dyn EditorGroups>,
    files: Rc<dyn FileService>,
    working_copies: Rc<dyn WorkingCopyService>,
    resolver: Rc<dyn EditorResolver>,
    trust: Rc<dyn WorkspaceTrust>,
    host: Rc<dyn HostService>,
    policy: Rc<dyn GroupPolicy>,
    identity: Rc<UriIdentity>,
    factory: EditorFactory,
    settings: RefCell<EditorSettings>,
    watches: Rc<OutsideWatches>,
    visibility: RefCell<Option<Subscription>>,
}

impl EditorService {
    pub fn new(collaborators: Collaborators, settings: EditorSettings) -> Self {
        let Collaborators {
            groups,
            files,
            working_copies,
            untitled,
            resolver,
            trust,
            host,
            policy,
            workspace,
            identity,
        } = collaborators;

        Self {
            factory: EditorFactory::new(
                identity.clone(),
                files.clone(),
                working_copies.clone(),
                untitled,
            ),
            watches: Rc::new(OutsideWatches::new(
                groups.clone(),
                files.clone(),
                workspace,
                identity.clone(),
            )),
            visibility: RefCell::default(),
            groups,
            files,
            working_copies,
            resolver,
            trust,
            host,
            policy,
            identity,
            settings: RefCell::new(settings),
        }
    }

    /// Wait for groups to be restored, then keep watching visible editors
    /// as they change.
    pub async fn start(&self) {
        self.groups.when_ready().await;
        let watches = Rc::downgrade(&self.watches);
        let subscription = self
            .groups
            .on_did_visible_editors_change(Box::new(move || {
                if let Some(watches) = watches.upgrade() {
                    watches.refresh();
                }
            }));
        *self.visibility.borrow_mut() = Some(subscription);
        self.handle_visible_editors_change();
        tracing::debug!("editor service ready");
    }

    pub fn update_configuration(&self, settings: &EditorSettings) {
        *self.settings.borrow_mut() = settings.clone();
    }

    pub fn settings(&self) -> EditorSettings {
        self.settings.borrow().clone()
    }

    pub fn factory(&self) -> &EditorFactory {
        &self.factory
    }

    pub fn identity(&self) -> &UriIdentity {
        &self.identity
    }

    pub fn groups(&self) -> &Rc<dyn EditorGroups> {
        &self.groups
    }

    /// Shorthand for [`EditorFactory::create`].
    pub fn create_editor_input(
        &self,
        request: &EditorRequest,
    ) -> Result<EditorHandle, EditorError> {
        self.factory.create(request)
    }

    pub fn active_editor(&self) -> Option<EditorHandle> {
        self.groups.active_group().active_editor()
    }

    /// The active editor of every group that has one.
    pub fn visible_editors(&self) -> Vec<EditorHandle> {
        visible_editors(self.groups.as_ref())
    }

    /// Every open editor, group by group in creation order.
    pub fn editors(&self) -> Vec<EditorHandle> {
        self.groups
            .groups(GroupsOrder::CreationTime)
            .iter()
            .flat_map(|group| group.editors(EditorsOrder::Sequential))
            .collect()
    }

    pub fn editors_by_order(
        &self,
        order: EditorsOrder,
        exclude_sticky: bool,
    ) -> Vec<EditorIdentifier> {
        let group_order = match order {
            EditorsOrder::Sequential => GroupsOrder::CreationTime,
            EditorsOrder::MostRecentlyActive => GroupsOrder::MostRecentlyActive,
        };
        let mut identifiers = Vec::new();
        for group in self.groups.groups(group_order) {
            for editor in group.editors(order) {
                if exclude_sticky && group.is_sticky(editor.as_ref()) {
                    continue;
                }
                identifiers.push(EditorIdentifier {
                    group: group.id(),
                    editor,
                });
            }
        }
        identifiers
    }

    pub fn count(&self) -> usize {
        self.groups
            .groups(GroupsOrder::CreationTime)
            .iter()
            .map(|group| group.count())
            .sum()
    }

    pub fn is_opened(&self, resource: &Resource) -> bool {
        !self.find_editors(resource).is_empty()
    }

    /// Open editors showing `resource`, most recently active first.
    pub fn find_editors(&self, resource: &Resource) -> Vec<EditorIdentifier> {
        self.editors_by_order(EditorsOrder::MostRecentlyActive, false)
            .into_iter()
            .filter(|identifier| {
                identifier
                    .editor
                    .resource()
                    .is_some_and(|candidate| self.identity.is_equal(&candidate, resource))
            })
            .collect()
    }

    /// Resources currently watched because a visible editor shows them.
    pub fn watched_resources(&self) -> Vec<Resource> {
        self.watches.resources()
    }

    /// Watch the files shown by visible editors outside the workspace, and
    /// stop watching everything else. Runs by itself once
    /// [`start`](Self::start) has subscribed to group changes.
    pub fn handle_visible_editors_change(&self) {
        self.watches.refresh();
    }

    /// Open one editor.
    ///
    /// `options` default to the ones carried by an untyped request. Returns
    /// `Ok(None)` when the resolver aborted the open or the group declined it.
    #[tracing::instrument(level = "debug", skip_all, fields(group = ?group))]
    pub async fn open_editor(
        &self,
        editor: impl Into<EditorRequest>,
        options: Option<EditorOptions>,
        group: Option<PreferredGroup>,
    ) -> Result<Option<EditorPane>, EditorError> {
        let request = editor.into();
        let options = options.or_else(|| request.options().cloned());

        let to_side = group == Some(PreferredGroup::Side);
        let Some(target) = self.resolve_open(request, options, group, to_side).await? else {
            return Ok(None);
        };
        let pane = target.group.open_editor(target.editor, target.options).await;
        self.handle_visible_editors_change();
        Ok(pane)
    }

    /// Open several editors, one batch per target group.
    #[tracing::instrument(level = "debug", skip_all, fields(editors = editors.len()))]
    pub async fn open_editors(
        &self,
        editors: Vec<OpenRequest>,
        group: Option<PreferredGroup>,
        options: OpenEditorsOptions,
    ) -> Result<Vec<EditorPane>, EditorError> {
        if options.validate_trust && !self.handle_workspace_trust(&editors).await {
            return Ok(Vec::new());
        }

        // Everything opened "to the side" lands in the same side group.
        let to_side = group == Some(PreferredGroup::Side);
        let group = match group {
            Some(PreferredGroup::Side) => {
                Some(PreferredGroup::Group(self.groups.side_group().id()))
            }
            other => other,
        };

        let mut batches: IndexMap<GroupId, (GroupHandle, Vec<EditorWithOptions>)> =
            IndexMap::new();
        for OpenRequest { editor, options } in editors {
            let Some(target) = self.resolve_open(editor, options, group, to_side).await? else {
                continue;
            };
            batches
                .entry(target.group.id())
                .or_insert_with(|| (target.group.clone(), Vec::new()))
                .1
                .push(EditorWithOptions {
                    editor: target.editor,
                    options: target.options,
                });
        }

        let mut panes = Vec::new();
        for (_, (group, editors)) in batches {
            if let Some(pane) = group.open_editors(editors).await {
                panes.push(pane);
            }
        }
        self.handle_visible_editors_change();
        Ok(panes)
    }

    /// Replace editors in one group.
    pub async fn replace_editors(
        &self,
        replacements: Vec<ReplaceRequest>,
        group: GroupId,
    ) -> Result<(), EditorError> {
        let target = self
            .groups
            .group(group)
            .ok_or(EditorError::GroupNotFound(group))?;

        let mut typed = Vec::with_capacity(replacements.len());
        for ReplaceRequest {
            editor,
            replacement,
            options,
        } in replacements
        {
            let editor = self.factory.create(&editor)?;
            let options = options.or_else(|| replacement.options().cloned());

            let (replacement, options) = if resolves_overrides(options.as_ref()) {
                let preferred = Some(PreferredGroup::Group(group));
                match self
                    .resolver
                    .resolve_editor(&replacement, options.as_ref(), preferred)
                    .await
                {
                    ResolvedEditor::Abort => {
                        tracing::debug!(editor = %editor.id(), "resolver aborted replacement");
                        continue;
                    }
                    ResolvedEditor::Resolved(resolved) => {
                        (resolved.editor, resolved.options.or(options))
                    }
                    ResolvedEditor::NotApplicable => (self.factory.create(&replacement)?, options),
                }
            } else {
                (self.factory.create(&replacement)?, options)
            };

            typed.push(EditorReplacement {
                editor,
                replacement,
                options,
            });
        }

        if !typed.is_empty() {
            target.replace_editors(typed).await;
            self.handle_visible_editors_change();
        }
        Ok(())
    }

    /// Tear down: stop watching and dispose every cached input.
    pub fn dispose(&self) {
        let visibility = self.visibility.borrow_mut().take();
        drop(visibility);
        self.watches.clear();
        self.factory.cache().dispose_all();
        tracing::debug!("editor service disposed");
    }

    async fn resolve_open(
        &self,
        request: EditorRequest,
        options: Option<EditorOptions>,
        preferred: Option<PreferredGroup>,
        to_side: bool,
    ) -> Result<Option<OpenTarget>, EditorError> {
        let mut options = options;
        let mut editor = None;
        let mut group = None;
        let mut activation = None;

        if resolves_overrides(options.as_ref()) {
            match self
                .resolver
                .resolve_editor(&request, options.as_ref(), preferred)
                .await
            {
                ResolvedEditor::Abort => {
                    tracing::debug!("resolver aborted open");
                    return Ok(None);
                }
                ResolvedEditor::Resolved(resolved) => {
                    editor = Some(resolved.editor);
                    options = resolved.options.or(options);
                    group = resolved.group.and_then(|id| self.groups.group(id));
                    activation = resolved.activation;
                }
                ResolvedEditor::NotApplicable => {}
            }
        }

        let editor = match editor {
            Some(editor) => editor,
            None => self.factory.create(&request)?,
        };
        let group = match group {
            Some(group) => group,
            None => self.policy.find_group(
                self.groups.as_ref(),
                editor.as_ref(),
                options.as_ref(),
                preferred,
                &self.settings.borrow(),
            ),
        };
        let options = self.activation_options(group.as_ref(), options, to_side, activation);

        Ok(Some(OpenTarget {
            editor,
            group,
            options,
        }))
    }

    /// Opening into a background group while keeping focus would otherwise
    /// leave the editor hidden, so activate that group explicitly. Side
    /// groups are exempt.
    fn activation_options(
        &self,
        group: &dyn EditorGroup,
        options: Option<EditorOptions>,
        to_side: bool,
        suggested: Option<EditorActivation>,
    ) -> Option<EditorOptions> {
        let mut options = options;
        if let Some(activation) = suggested {
            options.get_or_insert_with(EditorOptions::default).activation = Some(activation);
        }

        let current = options.as_mut()?;
        if group.id() != self.groups.active_group().id()
            && !current.is_inactive()
            && current.preserves_focus()
            && current.activation.is_none()
            && !to_side
        {
            current.activation = Some(EditorActivation::Activate);
        }
        options
    }

    /// Ask workspace trust for the resources in `editors`. `false` means do
    /// not open anything here.
    async fn handle_workspace_trust(&self, editors: &[OpenRequest]) -> bool {
        let mut resources: Vec<Resource> = Vec::new();
        let mut diff_mode = false;
        for OpenRequest { editor, .. } in editors {
            diff_mode |= editor.is_diff();
            for resource in editor.resources() {
                if !resources.contains(&resource) {
                    resources.push(resource);
                }
            }
        }
        if resources.is_empty() {
            return true;
        }

        match self.trust.request_open_files_trust(&resources).await {
            TrustResponse::Open => true,
            TrustResponse::OpenInNewWindow => {
                tracing::info!(
                    count = resources.len(),
                    "opening untrusted files in a new window"
                );
                self.host.open_window(&resources, diff_mode).await;
                false
            }
            TrustResponse::Cancel => {
                tracing::debug!("open cancelled by workspace trust");
                false
            }
        }
    }
}
