//! Turns editor requests into typed inputs, reusing cached ones.

use std::rc::Rc;

use wbe_source::Resource;
use wbe_source::UriIdentity;

use crate::cache::CachedEditorInput;
use crate::cache::EditorInputCache;
use crate::error::EditorError;
use crate::input::DiffEditorInput;
use crate::input::EditorHandle;
use crate::input::FileEditorInput;
use crate::input::PreferredMetadata;
use crate::input::ResourceEditorInput;
use crate::input::UntitledEditorInput;
use crate::request::EditorRequest;
use crate::request::RequestKind;
use crate::request::UntypedEditor;
use crate::services::FileService;
use crate::services::UntitledModels;
use crate::services::UntitledOptions;
use crate::services::WorkingCopyService;

pub struct EditorFactory {
    identity: Rc<UriIdentity>,
    files: Rc<dyn FileService>,
    working_copies: Rc<dyn WorkingCopyService>,
    untitled: Rc<dyn UntitledModels>,
    cache: EditorInputCache,
}

impl EditorFactory {
    pub fn new(
        identity: Rc<UriIdentity>,
        files: Rc<dyn FileService>,
        working_copies: Rc<dyn WorkingCopyService>,
        untitled: Rc<dyn UntitledModels>,
    ) -> Self {
        Self {
            cache: EditorInputCache::new(identity.clone()),
            identity,
            files,
            working_copies,
            untitled,
        }
    }

    pub fn cache(&self) -> &EditorInputCache {
        &self.cache
    }

    /// The typed input for `request`.
    ///
    /// Typed requests pass through unchanged. Untitled, file and resource
    /// inputs come from the cache; diffs are built fresh around cached sides.
    pub fn create(&self, request: &EditorRequest) -> Result<EditorHandle, EditorError> {
        match request.kind()? {
            RequestKind::Typed(editor) => Ok(editor.clone()),
            RequestKind::Diff {
                request,
                original,
                modified,
            } => {
                let side = |editor: &UntypedEditor| {
                    let mut editor = editor.clone();
                    editor.force_file = request.force_file;
                    self.create(&EditorRequest::Untyped(editor))
                };
                let original = side(original)?;
                let modified = side(modified)?;
                Ok(DiffEditorInput::new(
                    request.label.clone(),
                    request.description.clone(),
                    original,
                    modified,
                ))
            }
            RequestKind::Untitled(request) => self.create_untitled(request),
            RequestKind::Resource { request, resource } => {
                Ok(self.create_resource(request, resource))
            }
        }
    }

    fn create_untitled(&self, request: &UntypedEditor) -> Result<EditorHandle, EditorError> {
        let (untitled_resource, associated_resource) = match &request.resource {
            Some(resource) if resource.is_untitled() => (Some(resource.clone()), None),
            Some(resource) => (None, Some(resource.clone())),
            None => (None, None),
        };
        let model = self.untitled.create(UntitledOptions {
            untitled_resource,
            associated_resource,
            mode: request.mode.clone(),
            initial_value: request.contents.clone(),
            encoding: request.encoding.clone(),
        })?;

        let resource = model.resource();
        let input = self.cache.get_or_create(
            &resource,
            || CachedEditorInput::Untitled(UntitledEditorInput::new(model)),
            |_| {},
        );
        Ok(input.handle())
    }

    fn create_resource(&self, request: &UntypedEditor, resource: &Resource) -> EditorHandle {
        let canonical = self.identity.canonicalize(resource);
        let label = request
            .label
            .clone()
            .unwrap_or_else(|| resource.basename());

        let input = self.cache.get_or_create(
            &canonical,
            || {
                if request.force_file || self.files.can_handle_resource(&canonical) {
                    let preferred = PreferredMetadata {
                        resource: resource.clone(),
                        name: request.label.clone(),
                        description: request.description.clone(),
                        encoding: request.encoding.clone(),
                        mode: request.mode.clone(),
                        contents: request.contents.clone(),
                    };
                    CachedEditorInput::File(FileEditorInput::new(
                        canonical.clone(),
                        preferred,
                        self.working_copies.clone(),
                    ))
                } else {
                    let input = ResourceEditorInput::new(canonical.clone());
                    apply_presentation(&input, request, &label);
                    CachedEditorInput::Resource(input)
                }
            },
            |cached| match cached {
                CachedEditorInput::File(input) => input.update_preferred(resource, request),
                CachedEditorInput::Resource(input) => {
                    apply_presentation(input, request, &label);
                }
                CachedEditorInput::Untitled(_) => {}
            },
        );
        input.handle()
    }
}

fn apply_presentation(input: &ResourceEditorInput, request: &UntypedEditor, label: &str) {
    input.set_name(label);
    if let Some(description) = &request.description {
        input.set_description(description.clone());
    }
    if let Some(mode) = &request.mode {
        input.set_mode(mode.clone());
    }
    if let Some(contents) = &request.contents {
        input.set_contents(contents.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Capabilities;
    use crate::input::EditorInput;
    use crate::input::FILE_EDITOR_TYPE_ID;
    use crate::input::RESOURCE_EDITOR_TYPE_ID;
    use crate::test_support::resource;
    use crate::test_support::Harness;

    #[test]
    fn test_file_requests_share_one_input() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let request = EditorRequest::from(UntypedEditor::resource(resource("file:///proj/a.ts")));

        let first = factory.create(&request).unwrap();
        let second = factory.create(&request).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.type_id(), FILE_EDITOR_TYPE_ID);
    }

    #[test]
    fn test_cache_hit_updates_preferred_label() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let uri = resource("file:///proj/a.ts");

        let first = factory
            .create(&UntypedEditor::resource(uri.clone()).into())
            .unwrap();
        assert_eq!(first.name(), "a.ts");

        let second = factory
            .create(&UntypedEditor::resource(uri).with_label("Renamed").into())
            .unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.name(), "Renamed");
    }

    #[test]
    fn test_disposed_input_is_rebuilt() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let request = EditorRequest::from(UntypedEditor::resource(resource("file:///proj/a.ts")));

        let first = factory.create(&request).unwrap();
        first.dispose();
        let second = factory.create(&request).unwrap();
        assert_ne!(first.id(), second.id());
        assert!(!second.is_disposed());
    }

    #[test]
    fn test_unhandled_scheme_becomes_resource_input() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let input = factory
            .create(&UntypedEditor::resource(resource("git:/proj/a.ts")).into())
            .unwrap();
        assert_eq!(input.type_id(), RESOURCE_EDITOR_TYPE_ID);
        assert!(input.has_capability(Capabilities::READONLY));

        let forced = factory
            .create(
                &UntypedEditor::resource(resource("git:/proj/b.ts"))
                    .force_file()
                    .into(),
            )
            .unwrap();
        assert_eq!(forced.type_id(), FILE_EDITOR_TYPE_ID);
    }

    #[test]
    fn test_untitled_without_resource_is_always_new() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let first = factory.create(&UntypedEditor::untitled().into()).unwrap();
        let second = factory.create(&UntypedEditor::untitled().into()).unwrap();
        assert_ne!(first.id(), second.id());
        assert_ne!(first.resource(), second.resource());
        assert!(first.has_capability(Capabilities::UNTITLED));
    }

    #[test]
    fn test_untitled_resource_hint_reuses_input() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let first = factory.create(&UntypedEditor::untitled().into()).unwrap();
        let hint = UntypedEditor::resource(first.resource().unwrap());
        let second = factory.create(&hint.into()).unwrap();
        assert_eq!(first.id(), second.id());
    }

    #[test]
    fn test_disposing_untitled_input_disposes_model() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let input = factory
            .create(&UntypedEditor::untitled().with_contents("draft").into())
            .unwrap();
        let uri = input.resource().unwrap();
        assert!(input.is_dirty());
        assert!(harness.untitled.get(&uri).is_some());

        input.dispose();
        assert!(harness.untitled.get(&uri).is_none());
    }

    #[test]
    fn test_diff_is_fresh_but_sides_are_shared() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let request = EditorRequest::from(UntypedEditor::diff(
            UntypedEditor::resource(resource("file:///proj/a.ts")),
            UntypedEditor::resource(resource("file:///proj/b.ts")),
        ));

        let first = factory.create(&request).unwrap();
        let second = factory.create(&request).unwrap();
        assert_ne!(first.id(), second.id());
        assert!(first.matches(second.as_ref()));

        let plain = factory
            .create(&UntypedEditor::resource(resource("file:///proj/b.ts")).into())
            .unwrap();
        let (_, modified) = first.sides().unwrap();
        assert_eq!(modified.id(), plain.id());
    }

    #[test]
    fn test_diff_follows_side_disposal() {
        let harness = Harness::new();
        let factory = harness.service.factory();
        let diff = factory
            .create(
                &UntypedEditor::diff(
                    UntypedEditor::resource(resource("file:///proj/a.ts")),
                    UntypedEditor::resource(resource("file:///proj/b.ts")),
                )
                .into(),
            )
            .unwrap();
        let (original, _) = diff.sides().unwrap();
        original.dispose();
        assert!(diff.is_disposed());
    }
}
