//! File events the editor service reacts to.

use wbe_source::Resource;
use wbe_source::UriIdentity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileChangeType {
    Updated,
    Added,
    Deleted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileChange {
    pub resource: Resource,
    pub kind: FileChangeType,
}

/// A batch of changes observed on disk, usually outside the application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileChangesEvent {
    changes: Vec<FileChange>,
}

impl FileChangesEvent {
    pub fn new(changes: Vec<FileChange>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn got_deleted(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.kind == FileChangeType::Deleted)
    }

    /// Whether `resource` is affected by a change of `kind`. For deletions a
    /// deleted parent folder counts too.
    pub fn contains(
        &self,
        identity: &UriIdentity,
        resource: &Resource,
        kind: FileChangeType,
    ) -> bool {
        self.changes.iter().any(|change| {
            change.kind == kind
                && match kind {
                    FileChangeType::Deleted => {
                        identity.is_equal_or_parent(resource, &change.resource)
                    }
                    FileChangeType::Updated | FileChangeType::Added => {
                        identity.is_equal(resource, &change.resource)
                    }
                }
        })
    }
}

impl FromIterator<FileChange> for FileChangesEvent {
    fn from_iter<I: IntoIterator<Item = FileChange>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOperation {
    Create,
    Delete,
    Move,
    Copy,
}

/// An operation performed through the application itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOperationEvent {
    pub resource: Resource,
    pub operation: FileOperation,
    /// Destination of a move or copy.
    pub target: Option<Resource>,
}

impl FileOperationEvent {
    pub fn moved(source: Resource, target: Resource) -> Self {
        Self {
            resource: source,
            operation: FileOperation::Move,
            target: Some(target),
        }
    }

    pub fn deleted(resource: Resource) -> Self {
        Self {
            resource,
            operation: FileOperation::Delete,
            target: None,
        }
    }
}
