//! What callers ask to open: a ready editor, or a loose description of one.

use wbe_source::Resource;

use crate::error::EditorError;
use crate::input::EditorHandle;
use crate::options::EditorOptions;

/// A loose description of an editor, turned into a typed input by the
/// [`EditorFactory`](crate::EditorFactory).
///
/// Which input kind it produces:
/// - `original` and `modified` both set: a diff of the two;
/// - no resource, an `untitled:` resource or `force_untitled`: an untitled
///   buffer (a non-untitled resource becomes its associated file);
/// - any other resource: a file editor when the file service can handle it or
///   `force_file` is set, a read-only resource editor otherwise.
#[derive(Clone, Debug, Default)]
pub struct UntypedEditor {
    pub resource: Option<Resource>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub encoding: Option<String>,
    pub mode: Option<String>,
    pub contents: Option<String>,
    pub force_file: bool,
    pub force_untitled: bool,
    pub original: Option<Box<UntypedEditor>>,
    pub modified: Option<Box<UntypedEditor>>,
    pub options: Option<EditorOptions>,
}

impl UntypedEditor {
    pub fn resource(resource: Resource) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }

    pub fn untitled() -> Self {
        Self {
            force_untitled: true,
            ..Self::default()
        }
    }

    pub fn diff(original: UntypedEditor, modified: UntypedEditor) -> Self {
        Self {
            original: Some(Box::new(original)),
            modified: Some(Box::new(modified)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn force_file(mut self) -> Self {
        self.force_file = true;
        self
    }

    /// Every resource this request mentions, diff sides included.
    pub fn resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self.resource.iter().cloned().collect();
        for side in [&self.original, &self.modified].into_iter().flatten() {
            resources.extend(side.resources());
        }
        resources
    }

    pub fn is_diff(&self) -> bool {
        self.original.is_some() || self.modified.is_some()
    }
}

/// Something to open: a typed editor or an untyped description.
#[derive(Clone, Debug)]
pub enum EditorRequest {
    Typed(EditorHandle),
    Untyped(UntypedEditor),
}

impl EditorRequest {
    /// Options carried by the request itself.
    pub fn options(&self) -> Option<&EditorOptions> {
        match self {
            EditorRequest::Typed(_) => None,
            EditorRequest::Untyped(editor) => editor.options.as_ref(),
        }
    }

    pub fn resources(&self) -> Vec<Resource> {
        match self {
            EditorRequest::Typed(editor) => match editor.sides() {
                Some((original, modified)) => {
                    original.resource().into_iter().chain(modified.resource()).collect()
                }
                None => editor.resource().into_iter().collect(),
            },
            EditorRequest::Untyped(editor) => editor.resources(),
        }
    }

    pub fn is_diff(&self) -> bool {
        match self {
            EditorRequest::Typed(editor) => editor.sides().is_some(),
            EditorRequest::Untyped(editor) => editor.is_diff(),
        }
    }

    pub(crate) fn kind(&self) -> Result<RequestKind<'_>, EditorError> {
        let editor = match self {
            EditorRequest::Typed(editor) => return Ok(RequestKind::Typed(editor)),
            EditorRequest::Untyped(editor) => editor,
        };

        match (editor.original.as_deref(), editor.modified.as_deref()) {
            (Some(original), Some(modified)) => {
                return Ok(RequestKind::Diff {
                    request: editor,
                    original,
                    modified,
                })
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(EditorError::UnsupportedInputKind(
                    "diff request is missing one side",
                ))
            }
            (None, None) => {}
        }

        match &editor.resource {
            Some(resource) if !editor.force_untitled && !resource.is_untitled() => {
                Ok(RequestKind::Resource { request: editor, resource })
            }
            _ => Ok(RequestKind::Untitled(editor)),
        }
    }
}

impl From<EditorHandle> for EditorRequest {
    fn from(editor: EditorHandle) -> Self {
        EditorRequest::Typed(editor)
    }
}

impl From<UntypedEditor> for EditorRequest {
    fn from(editor: UntypedEditor) -> Self {
        EditorRequest::Untyped(editor)
    }
}

/// An editor request paired with options for opening it.
#[derive(Clone, Debug)]
pub struct OpenRequest {
    pub editor: EditorRequest,
    pub options: Option<EditorOptions>,
}

impl OpenRequest {
    pub fn new(editor: impl Into<EditorRequest>) -> Self {
        let editor = editor.into();
        let options = editor.options().cloned();
        Self { editor, options }
    }

    #[must_use]
    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl From<EditorHandle> for OpenRequest {
    fn from(editor: EditorHandle) -> Self {
        Self::new(editor)
    }
}

impl From<UntypedEditor> for OpenRequest {
    fn from(editor: UntypedEditor) -> Self {
        Self::new(editor)
    }
}

/// Replace `editor` with `replacement` in a group.
#[derive(Clone, Debug)]
pub struct ReplaceRequest {
    pub editor: EditorRequest,
    pub replacement: EditorRequest,
    pub options: Option<EditorOptions>,
}

#[derive(Debug)]
pub(crate) enum RequestKind<'a> {
    Typed(&'a EditorHandle),
    Diff {
        request: &'a UntypedEditor,
        original: &'a UntypedEditor,
        modified: &'a UntypedEditor,
    },
    Untitled(&'a UntypedEditor),
    Resource {
        request: &'a UntypedEditor,
        resource: &'a Resource,
    },
}
