//! Keeping open editors in line with the file system.

use futures::future::join_all;
use indexmap::IndexSet;
use wbe_source::Resource;

use super::EditorService;
use crate::events::FileChangeType;
use crate::events::FileChangesEvent;
use crate::events::FileOperation;
use crate::events::FileOperationEvent;
use crate::group::EditorGroup;
use crate::group::EditorsOrder;
use crate::group::GroupsOrder;
use crate::input::Capabilities;
use crate::input::EditorHandle;
use crate::input::EditorInput;
use crate::options::EditorOptions;
use crate::request::EditorRequest;
use crate::request::ReplaceRequest;

/// What was deleted: one resource, or whatever a change batch deleted.
#[derive(Clone, Copy)]
enum Deleted<'a> {
    Resource(&'a Resource),
    Changes(&'a FileChangesEvent),
}

impl EditorService {
    /// React to a file operation performed through the application.
    pub async fn handle_file_operation(&self, event: &FileOperationEvent) {
        match (event.operation, event.target.as_ref()) {
            (FileOperation::Move, Some(target)) => {
                self.handle_moved_file(&event.resource, target).await;
                self.handle_deleted_file(Deleted::Resource(&event.resource), false, Some(target))
                    .await;
            }
            (FileOperation::Delete | FileOperation::Move, _) => {
                self.handle_deleted_file(Deleted::Resource(&event.resource), false, None)
                    .await;
            }
            (FileOperation::Create | FileOperation::Copy, _) => {}
        }
    }

    /// React to changes observed on disk.
    pub async fn handle_files_change(&self, event: &FileChangesEvent) {
        if event.got_deleted() {
            self.handle_deleted_file(Deleted::Changes(event), true, None)
                .await;
        }
    }

    /// Re-point editors at or below `source` to the matching path below
    /// `target`, keeping their place and flags in each group.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source, target = %target))]
    async fn handle_moved_file(&self, source: &Resource, target: &Resource) {
        // A case-only rename must not resolve back to the old spelling.
        self.identity.forget(source);
        for group in self.groups.groups(GroupsOrder::CreationTime) {
            let mut replacements = Vec::new();
            for editor in group.editors(EditorsOrder::Sequential) {
                let Some(resource) = editor.resource() else {
                    continue;
                };
                let Some(relative) = self.identity.relative_path(source, &resource) else {
                    continue;
                };
                let moved_to = target.join(&relative);
                let Some(moved) = editor.rename(group.id(), &moved_to) else {
                    continue;
                };

                let placement = EditorOptions {
                    preserve_focus: Some(true),
                    pinned: Some(group.is_pinned(editor.as_ref())),
                    sticky: Some(group.is_sticky(editor.as_ref())),
                    index: group.index_of(editor.as_ref()),
                    inactive: Some(!group.is_active(editor.as_ref())),
                    ..EditorOptions::default()
                };
                let (replacement, options) = match moved.editor {
                    EditorRequest::Untyped(mut untyped) => {
                        let base = untyped.options.take().or(moved.options).unwrap_or_default();
                        (EditorRequest::Untyped(untyped), base.merge(placement))
                    }
                    typed @ EditorRequest::Typed(_) => {
                        (typed, moved.options.unwrap_or_default().merge(placement))
                    }
                };

                tracing::debug!(from = %resource, to = %moved_to, group = %group.id(), "following moved file");
                replacements.push(ReplaceRequest {
                    editor: EditorRequest::Typed(editor.clone()),
                    replacement,
                    options: Some(options),
                });
            }

            if replacements.is_empty() {
                continue;
            }
            if let Err(error) = self.replace_editors(replacements, group.id()).await {
                tracing::warn!(%error, group = %group.id(), "failed to replace moved editors");
            }
        }
    }

    /// Close clean editors whose document is gone.
    ///
    /// Dirty editors are never closed. External deletions are re-checked after
    /// a short delay because many tools save by deleting and re-creating.
    #[tracing::instrument(level = "debug", skip_all, fields(external = is_external))]
    async fn handle_deleted_file(
        &self,
        deleted: Deleted<'_>,
        is_external: bool,
        moved_to: Option<&Resource>,
    ) {
        let settings = self.settings();
        let delay = settings.delete_recheck_delay();

        let checks = self.all_non_dirty_editors().into_iter().map(|editor| {
            let settings = &settings;
            async move {
                let Some(resource) = editor.resource() else {
                    return;
                };

                // An external delete of a file with a working copy is left to
                // the working copy unless the user wants such editors closed.
                if is_external
                    && !settings.close_on_file_delete
                    && self.working_copies.has(&resource)
                {
                    return;
                }
                // The document moved and the editor already follows it.
                if moved_to.is_some_and(|target| self.identity.is_equal_or_parent(&resource, target)) {
                    return;
                }
                let affected = match deleted {
                    Deleted::Resource(gone) => self.identity.is_equal_or_parent(&resource, gone),
                    Deleted::Changes(event) => {
                        event.contains(&self.identity, &resource, FileChangeType::Deleted)
                    }
                };
                if !affected {
                    return;
                }

                let mut exists = false;
                if is_external && self.files.can_handle_resource(&resource) {
                    tokio::time::sleep(delay).await;
                    exists = self.files.exists(&resource).await;
                }

                if !exists && !editor.is_disposed() && !editor.is_dirty() {
                    tracing::info!(resource = %resource, "closing editor of deleted file");
                    editor.dispose();
                }
            }
        });
        join_all(checks).await;
        self.handle_visible_editors_change();
    }

    /// Clean editors, with diffs split into their sides. Untitled editors
    /// have nothing on disk to lose and are left out.
    fn all_non_dirty_editors(&self) -> Vec<EditorHandle> {
        let mut seen = IndexSet::new();
        let mut editors = Vec::new();
        let mut visit = |editor: EditorHandle| {
            if editor.is_dirty() || editor.has_capability(Capabilities::UNTITLED) {
                return;
            }
            if seen.insert(editor.id()) {
                editors.push(editor);
            }
        };

        for editor in self.editors() {
            match editor.sides() {
                Some((original, modified)) => {
                    visit(original);
                    visit(modified);
                }
                None => visit(editor),
            }
        }
        editors
    }
}
