use futures::future::join_all;

use super::EditorService;
use crate::group::EditorGroup;
use crate::group::EditorIdentifier;
use crate::group::EditorsOrder;
use crate::group::GroupId;
use crate::group::GroupsOrder;
use crate::group::PreferredGroup;
use crate::input::Capabilities;
use crate::input::EditorHandle;
use crate::input::EditorInput;
use crate::input::RevertOptions;
use crate::input::SaveOptions;
use crate::input::SaveReason;
use crate::input::SavedEditor;
use crate::options::EditorOptions;
use crate::request::EditorRequest;
use crate::request::ReplaceRequest;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveAllOptions {
    pub save: SaveOptions,
    pub include_untitled: bool,
    pub exclude_sticky: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevertAllOptions {
    pub revert: RevertOptions,
    pub include_untitled: bool,
    pub exclude_sticky: bool,
}

impl EditorService {
    /// Save `editors`. Returns `true` only if every save succeeded.
    ///
    /// Editors with a target save concurrently. Untitled editors, and every
    /// editor under `save_as`, need a target chosen interactively: they are
    /// revealed and saved one at a time, and the first cancellation stops
    /// the rest.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(editors = editors.len(), save_as = options.save_as)
    )]
    pub async fn save(&self, editors: Vec<EditorIdentifier>, options: &SaveOptions) -> bool {
        let editors = unique_editors(editors);
        let (sequential, parallel): (Vec<_>, Vec<_>) = if options.save_as {
            (editors, Vec::new())
        } else {
            editors
                .into_iter()
                .partition(|identifier| identifier.editor.has_capability(Capabilities::UNTITLED))
        };

        let saves = parallel.iter().map(|EditorIdentifier { group, editor }| {
            self.pin_on_explicit(*group, editor.as_ref(), options.reason);
            editor.save(*group, options)
        });
        let mut results: Vec<bool> = join_all(saves)
            .await
            .into_iter()
            .map(|saved| saved.is_some())
            .collect();

        for EditorIdentifier { group, editor } in sequential {
            if editor.is_disposed() {
                continue;
            }

            // Show the editor before asking where it should go.
            let pane = match self
                .open_editor(editor.clone(), None, Some(PreferredGroup::Group(group)))
                .await
            {
                Ok(pane) => pane,
                Err(error) => {
                    tracing::warn!(%error, editor = %editor.id(), "failed to reveal editor before saving");
                    None
                }
            };
            let replacement_options = EditorOptions {
                pinned: Some(true),
                view_state: pane.and_then(|pane| pane.view_state),
                ..EditorOptions::default()
            };

            let saved = if options.save_as {
                editor.save_as(group, options).await
            } else {
                editor.save(group, options).await
            };
            let Some(saved) = saved else {
                tracing::debug!(editor = %editor.id(), "save cancelled, skipping remaining editors");
                results.push(false);
                break;
            };
            results.push(true);

            let replacement = match saved {
                SavedEditor::Same => continue,
                SavedEditor::Editor(replacement) => replacement,
                SavedEditor::Untyped(untyped) => {
                    match self.factory.create(&EditorRequest::Untyped(untyped)) {
                        Ok(replacement) => replacement,
                        Err(error) => {
                            tracing::warn!(%error, "failed to build editor for saved document");
                            continue;
                        }
                    }
                }
            };
            if replacement.matches(editor.as_ref()) {
                continue;
            }
            self.replace_saved(&editor, group, &replacement, &replacement_options)
                .await;
        }

        results.iter().all(|saved| *saved)
    }

    pub async fn save_all(&self, options: &SaveAllOptions) -> bool {
        let editors = self.all_dirty_editors(options.include_untitled, options.exclude_sticky);
        self.save(editors, &options.save).await
    }

    /// Revert `editors` concurrently. Returns `true` if none is left dirty.
    pub async fn revert(&self, editors: Vec<EditorIdentifier>, options: &RevertOptions) -> bool {
        let editors = unique_editors(editors);
        let reverts = editors.iter().map(|EditorIdentifier { group, editor }| {
            if let Some(target) = self.groups.group(*group) {
                target.pin_editor(editor.as_ref());
            }
            editor.revert(*group, options)
        });
        join_all(reverts).await;

        !editors
            .iter()
            .any(|identifier| identifier.editor.is_dirty())
    }

    pub async fn revert_all(&self, options: &RevertAllOptions) -> bool {
        let editors = self.all_dirty_editors(options.include_untitled, options.exclude_sticky);
        self.revert(editors, &options.revert).await
    }

    /// Dirty editors, most recently active first.
    pub fn all_dirty_editors(
        &self,
        include_untitled: bool,
        exclude_sticky: bool,
    ) -> Vec<EditorIdentifier> {
        let mut editors = Vec::new();
        for group in self.groups.groups(GroupsOrder::MostRecentlyActive) {
            for editor in group.editors(EditorsOrder::MostRecentlyActive) {
                if !editor.is_dirty() {
                    continue;
                }
                if !include_untitled && editor.has_capability(Capabilities::UNTITLED) {
                    continue;
                }
                if exclude_sticky && group.is_sticky(editor.as_ref()) {
                    continue;
                }
                editors.push(EditorIdentifier {
                    group: group.id(),
                    editor,
                });
            }
        }
        editors
    }

    fn pin_on_explicit(&self, group: GroupId, editor: &dyn EditorInput, reason: SaveReason) {
        if reason != SaveReason::Explicit {
            return;
        }
        if let Some(group) = self.groups.group(group) {
            group.pin_editor(editor);
        }
    }

    /// Swap a saved editor for the one showing its new location. Untitled
    /// editors are replaced in every group, anything else only where it was
    /// saved.
    async fn replace_saved(
        &self,
        editor: &EditorHandle,
        group: GroupId,
        replacement: &EditorHandle,
        options: &EditorOptions,
    ) {
        let groups = if editor.has_capability(Capabilities::UNTITLED) {
            self.groups
                .groups(GroupsOrder::CreationTime)
                .iter()
                .filter(|candidate| candidate.contains(editor.as_ref()))
                .map(|candidate| candidate.id())
                .collect()
        } else {
            vec![group]
        };

        for group in groups {
            let request = ReplaceRequest {
                editor: EditorRequest::Typed(editor.clone()),
                replacement: EditorRequest::Typed(replacement.clone()),
                options: Some(options.clone()),
            };
            if let Err(error) = self.replace_editors(vec![request], group).await {
                tracing::warn!(%error, group = %group, "failed to replace saved editor");
            }
        }
    }
}

/// Drop editors that match one already listed, in any group. The first
/// occurrence and its group are kept.
fn unique_editors(editors: Vec<EditorIdentifier>) -> Vec<EditorIdentifier> {
    let mut unique: Vec<EditorIdentifier> = Vec::with_capacity(editors.len());
    for identifier in editors {
        let seen = unique
            .iter()
            .any(|kept| kept.editor.matches(identifier.editor.as_ref()));
        if !seen {
            unique.push(identifier);
        }
    }
    unique
}
