//! Editor lifecycle for a multi-group workbench.
//!
//! [`EditorService`] turns open requests into editor inputs, places them in
//! groups, saves and reverts them, and keeps them consistent with file moves
//! and deletions. Inputs are deduplicated per canonical resource by the
//! [`EditorInputCache`].

mod cache;
mod dispose;
mod error;
mod events;
mod factory;
mod fs;
mod group;
mod input;
mod options;
mod part;
mod policy;
mod request;
mod resolver;
mod service;
mod services;
mod untitled;
mod working_copies;

#[cfg(test)]
mod test_support;

pub use crate::cache::CachedEditorInput;
pub use crate::cache::EditorInputCache;
pub use crate::dispose::DisposeEmitter;
pub use crate::dispose::Subscription;
pub use crate::error::EditorError;
pub use crate::events::FileChange;
pub use crate::events::FileChangeType;
pub use crate::events::FileChangesEvent;
pub use crate::events::FileOperation;
pub use crate::events::FileOperationEvent;
pub use crate::factory::EditorFactory;
pub use crate::fs::OsFileService;
pub use crate::group::EditorGroup;
pub use crate::group::EditorGroups;
pub use crate::group::EditorIdentifier;
pub use crate::group::EditorPane;
pub use crate::group::EditorReplacement;
pub use crate::group::EditorWithOptions;
pub use crate::group::EditorsOrder;
pub use crate::group::GroupHandle;
pub use crate::group::GroupId;
pub use crate::group::GroupsOrder;
pub use crate::group::PreferredGroup;
pub use crate::input::Capabilities;
pub use crate::input::DiffEditorInput;
pub use crate::input::EditorHandle;
pub use crate::input::EditorId;
pub use crate::input::EditorInput;
pub use crate::input::FileEditorInput;
pub use crate::input::MoveResult;
pub use crate::input::PreferredMetadata;
pub use crate::input::ResourceEditorInput;
pub use crate::input::RevertOptions;
pub use crate::input::SaveOptions;
pub use crate::input::SaveReason;
pub use crate::input::SavedEditor;
pub use crate::input::UntitledEditorInput;
pub use crate::input::DIFF_EDITOR_TYPE_ID;
pub use crate::input::FILE_EDITOR_TYPE_ID;
pub use crate::input::RESOURCE_EDITOR_TYPE_ID;
pub use crate::input::UNTITLED_EDITOR_TYPE_ID;
pub use crate::options::EditorActivation;
pub use crate::options::EditorOptions;
pub use crate::options::OverridePolicy;
pub use crate::options::ViewState;
pub use crate::part::EditorGroupModel;
pub use crate::part::EditorPart;
pub use crate::policy::DefaultGroupPolicy;
pub use crate::policy::GroupPolicy;
pub use crate::request::EditorRequest;
pub use crate::request::OpenRequest;
pub use crate::request::ReplaceRequest;
pub use crate::request::UntypedEditor;
pub use crate::resolver::EditorResolver;
pub use crate::resolver::NoOverrides;
pub use crate::resolver::ResolvedEditor;
pub use crate::resolver::ResolvedOpen;
pub use crate::service::Collaborators;
pub use crate::service::EditorService;
pub use crate::service::OpenEditorsOptions;
pub use crate::service::RevertAllOptions;
pub use crate::service::SaveAllOptions;
pub use crate::services::FileService;
pub use crate::services::HeadlessHost;
pub use crate::services::HostService;
pub use crate::services::TrustAll;
pub use crate::services::TrustResponse;
pub use crate::services::UntitledModel;
pub use crate::services::UntitledModels;
pub use crate::services::UntitledOptions;
pub use crate::services::WorkingCopyService;
pub use crate::services::WorkspaceFolders;
pub use crate::services::WorkspaceTrust;
pub use crate::untitled::UntitledBuffer;
pub use crate::untitled::UntitledBuffers;
pub use crate::working_copies::WorkingCopies;
