use wbe_source::ResourceError;

use crate::group::GroupId;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The request is none of: a typed editor, a diff with both sides, an
    /// untitled request or a resource request.
    #[error("unsupported editor input: {0}")]
    UnsupportedInputKind(&'static str),
    #[error("editor group {0} does not exist")]
    GroupNotFound(GroupId),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
