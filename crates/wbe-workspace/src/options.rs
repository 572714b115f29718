use serde_json::Value;

/// Opaque per-editor view state (scroll position, selections, ...).
pub type ViewState = Value;

/// How a group is activated when an editor opens in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorActivation {
    /// Activate the group.
    Activate,
    /// Restore the group if it is minimized, without activating it.
    Restore,
    /// Leave the group's activation untouched.
    Preserve,
}

/// Whether the editor resolver may substitute a different editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    #[default]
    Resolve,
    Disabled,
}

/// Options for opening an editor in a group.
///
/// `Option` fields distinguish "unset" from an explicit `false`, which matters
/// when options are layered with [`merge`](Self::merge).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorOptions {
    pub preserve_focus: Option<bool>,
    pub pinned: Option<bool>,
    pub sticky: Option<bool>,
    pub inactive: Option<bool>,
    /// Position in the target group.
    pub index: Option<usize>,
    pub activation: Option<EditorActivation>,
    pub override_policy: OverridePolicy,
    /// Prefer any group where the editor is already the visible one.
    pub reveal_if_visible: bool,
    /// Prefer any group that already contains the editor.
    pub reveal_if_opened: bool,
    pub view_state: Option<ViewState>,
}

impl EditorOptions {
    pub fn preserves_focus(&self) -> bool {
        self.preserve_focus.unwrap_or(false)
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.unwrap_or(false)
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky.unwrap_or(false)
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive.unwrap_or(false)
    }

    pub fn resolves_overrides(&self) -> bool {
        self.override_policy == OverridePolicy::Resolve
    }

    /// Layer `overrides` on top of `self`. Anything `overrides` sets wins.
    #[must_use]
    pub fn merge(self, overrides: EditorOptions) -> Self {
        Self {
            preserve_focus: overrides.preserve_focus.or(self.preserve_focus),
            pinned: overrides.pinned.or(self.pinned),
            sticky: overrides.sticky.or(self.sticky),
            inactive: overrides.inactive.or(self.inactive),
            index: overrides.index.or(self.index),
            activation: overrides.activation.or(self.activation),
            override_policy: match overrides.override_policy {
                OverridePolicy::Disabled => OverridePolicy::Disabled,
                OverridePolicy::Resolve => self.override_policy,
            },
            reveal_if_visible: overrides.reveal_if_visible || self.reveal_if_visible,
            reveal_if_opened: overrides.reveal_if_opened || self.reveal_if_opened,
            view_state: overrides.view_state.or(self.view_state),
        }
    }
}

/// Whether the resolver should be consulted for `options`.
pub(crate) fn resolves_overrides(options: Option<&EditorOptions>) -> bool {
    options.is_none_or(EditorOptions::resolves_overrides)
}
