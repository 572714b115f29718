//! Choosing the group an editor opens in.

use wbe_conf::EditorSettings;

use crate::group::EditorGroups;
use crate::group::GroupHandle;
use crate::group::GroupsOrder;
use crate::group::PreferredGroup;
use crate::input::EditorInput;
use crate::options::EditorOptions;

pub trait GroupPolicy {
    fn find_group(
        &self,
        groups: &dyn EditorGroups,
        editor: &dyn EditorInput,
        options: Option<&EditorOptions>,
        preferred: Option<PreferredGroup>,
        settings: &EditorSettings,
    ) -> GroupHandle;
}

/// Explicit group, then side group, then a group already showing or holding
/// the editor, then the active group.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultGroupPolicy;

impl GroupPolicy for DefaultGroupPolicy {
    fn find_group(
        &self,
        groups: &dyn EditorGroups,
        editor: &dyn EditorInput,
        options: Option<&EditorOptions>,
        preferred: Option<PreferredGroup>,
        settings: &EditorSettings,
    ) -> GroupHandle {
        match preferred {
            Some(PreferredGroup::Group(id)) => {
                if let Some(group) = groups.group(id) {
                    return group;
                }
                tracing::debug!(group = %id, "preferred group is gone, using the active group");
            }
            Some(PreferredGroup::Side) => return groups.side_group(),
            Some(PreferredGroup::Active) | None => {
                if let Some(group) = existing_group(groups, editor, options, settings) {
                    return group;
                }
            }
        }
        groups.active_group()
    }
}

/// A group that already has `editor`, when the options or settings ask for one.
///
/// An explicit index means the caller wants a specific position in the active
/// group, so no other group is considered.
fn existing_group(
    groups: &dyn EditorGroups,
    editor: &dyn EditorInput,
    options: Option<&EditorOptions>,
    settings: &EditorSettings,
) -> Option<GroupHandle> {
    let options = options.cloned().unwrap_or_default();
    if options.index.is_some() {
        return None;
    }

    let by_recency = groups.groups(GroupsOrder::MostRecentlyActive);

    if options.reveal_if_visible {
        if let Some(group) = by_recency.iter().find(|group| group.is_active(editor)) {
            return Some(group.clone());
        }
    }

    if options.reveal_if_opened || settings.reveal_if_open {
        let showing = by_recency.iter().find(|group| group.is_active(editor));
        let holding = by_recency.iter().find(|group| group.contains(editor));
        return showing.or(holding).cloned();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::EditorGroup;
    use crate::input::EditorHandle;
    use crate::options::EditorOptions;
    use crate::part::EditorPart;
    use crate::test_support::TestEditor;

    fn settings() -> EditorSettings {
        EditorSettings::default()
    }

    async fn open(group: &GroupHandle, editor: &EditorHandle, options: EditorOptions) {
        group.open_editor(editor.clone(), Some(options)).await;
    }

    #[tokio::test]
    async fn test_explicit_and_side_groups() {
        let part = EditorPart::new();
        let second = part.add_group();
        let editor: EditorHandle = TestEditor::new("a");

        let found = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            None,
            Some(PreferredGroup::Group(second.id())),
            &settings(),
        );
        assert_eq!(found.id(), second.id());

        let side = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            None,
            Some(PreferredGroup::Side),
            &settings(),
        );
        assert_ne!(side.id(), part.active_group().id());
    }

    #[tokio::test]
    async fn test_reveal_if_opened_prefers_holding_group() {
        let part = EditorPart::new();
        let first = part.active_group();
        let second: GroupHandle = part.add_group();
        let editor: EditorHandle = TestEditor::new("a");
        let other: EditorHandle = TestEditor::new("b");

        open(&second, &editor, EditorOptions::default()).await;
        open(&second, &other, EditorOptions::default()).await;
        part.activate_group(first.id());

        let plain = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            None,
            None,
            &settings(),
        );
        assert_eq!(plain.id(), first.id());

        let options = EditorOptions {
            reveal_if_opened: true,
            ..EditorOptions::default()
        };
        let revealed = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            Some(&options),
            None,
            &settings(),
        );
        assert_eq!(revealed.id(), second.id());

        let from_setting = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            None,
            Some(PreferredGroup::Active),
            &EditorSettings {
                reveal_if_open: true,
                ..settings()
            },
        );
        assert_eq!(from_setting.id(), second.id());
    }

    #[tokio::test]
    async fn test_reveal_if_visible_needs_active_editor() {
        let part = EditorPart::new();
        let first = part.active_group();
        let second: GroupHandle = part.add_group();
        let editor: EditorHandle = TestEditor::new("a");
        let other: EditorHandle = TestEditor::new("b");

        open(&second, &editor, EditorOptions::default()).await;
        open(&second, &other, EditorOptions::default()).await;
        part.activate_group(first.id());

        let options = EditorOptions {
            reveal_if_visible: true,
            ..EditorOptions::default()
        };
        let hidden = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            Some(&options),
            None,
            &settings(),
        );
        assert_eq!(hidden.id(), first.id());

        let visible = DefaultGroupPolicy.find_group(
            part.as_ref(),
            other.as_ref(),
            Some(&options),
            None,
            &settings(),
        );
        assert_eq!(visible.id(), second.id());
    }

    #[tokio::test]
    async fn test_index_keeps_active_group() {
        let part = EditorPart::new();
        let first = part.active_group();
        let second: GroupHandle = part.add_group();
        let editor: EditorHandle = TestEditor::new("a");
        open(&second, &editor, EditorOptions::default()).await;
        part.activate_group(first.id());

        let options = EditorOptions {
            reveal_if_opened: true,
            index: Some(0),
            ..EditorOptions::default()
        };
        let found = DefaultGroupPolicy.find_group(
            part.as_ref(),
            editor.as_ref(),
            Some(&options),
            None,
            &settings(),
        );
        assert_eq!(found.id(), first.id());
    }
}
