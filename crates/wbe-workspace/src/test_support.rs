//! Fakes shared by the unit tests.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use rustc_hash::FxHashSet;
use wbe_conf::EditorSettings;
use wbe_source::PathCasing;
use wbe_source::Resource;
use wbe_source::UriIdentity;

use crate::dispose::DisposeEmitter;
use crate::dispose::Subscription;
use crate::group::GroupId;
use crate::group::PreferredGroup;
use crate::input::Capabilities;
use crate::input::EditorId;
use crate::input::EditorInput;
use crate::input::RevertOptions;
use crate::input::SaveOptions;
use crate::input::SavedEditor;
use crate::options::EditorOptions;
use crate::part::EditorPart;
use crate::policy::DefaultGroupPolicy;
use crate::request::EditorRequest;
use crate::resolver::EditorResolver;
use crate::resolver::ResolvedEditor;
use crate::service::Collaborators;
use crate::service::EditorService;
use crate::services::FileService;
use crate::services::HostService;
use crate::services::TrustResponse;
use crate::services::WorkspaceFolders;
use crate::services::WorkspaceTrust;
use crate::untitled::UntitledBuffers;
use crate::working_copies::WorkingCopies;

pub(crate) fn resource(s: &str) -> Resource {
    Resource::parse(s).unwrap()
}

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

/// Files that exist are listed explicitly; watches are recorded.
#[derive(Default)]
pub(crate) struct FakeFiles {
    existing: RefCell<FxHashSet<Resource>>,
    watched: Rc<RefCell<Vec<Resource>>>,
    exists_calls: Cell<usize>,
}

impl FakeFiles {
    pub(crate) fn add(&self, resource: Resource) {
        self.existing.borrow_mut().insert(resource);
    }

    pub(crate) fn watched(&self) -> Vec<Resource> {
        self.watched.borrow().clone()
    }

    pub(crate) fn exists_calls(&self) -> usize {
        self.exists_calls.get()
    }
}

#[async_trait(?Send)]
impl FileService for FakeFiles {
    fn can_handle_resource(&self, resource: &Resource) -> bool {
        resource.is_file()
    }

    async fn exists(&self, resource: &Resource) -> bool {
        self.exists_calls.set(self.exists_calls.get() + 1);
        self.existing.borrow().contains(resource)
    }

    fn watch(&self, resource: &Resource) -> Subscription {
        self.watched.borrow_mut().push(resource.clone());
        let watched = self.watched.clone();
        let resource = resource.clone();
        Subscription::new(move || watched.borrow_mut().retain(|watch| *watch != resource))
    }
}

/// Answers with queued responses, then `NotApplicable`.
#[derive(Default)]
pub(crate) struct FakeResolver {
    responses: RefCell<VecDeque<ResolvedEditor>>,
    calls: Cell<usize>,
}

impl FakeResolver {
    pub(crate) fn respond(&self, response: ResolvedEditor) {
        self.responses.borrow_mut().push_back(response);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl EditorResolver for FakeResolver {
    async fn resolve_editor(
        &self,
        _request: &EditorRequest,
        _options: Option<&EditorOptions>,
        _preferred: Option<PreferredGroup>,
    ) -> ResolvedEditor {
        self.calls.set(self.calls.get() + 1);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(ResolvedEditor::NotApplicable)
    }
}

pub(crate) struct FakeTrust {
    pub(crate) response: Cell<TrustResponse>,
    pub(crate) requests: RefCell<Vec<Vec<Resource>>>,
}

impl Default for FakeTrust {
    fn default() -> Self {
        Self {
            response: Cell::new(TrustResponse::Open),
            requests: RefCell::default(),
        }
    }
}

#[async_trait(?Send)]
impl WorkspaceTrust for FakeTrust {
    async fn request_open_files_trust(&self, resources: &[Resource]) -> TrustResponse {
        self.requests.borrow_mut().push(resources.to_vec());
        self.response.get()
    }
}

#[derive(Default)]
pub(crate) struct FakeHost {
    pub(crate) windows: RefCell<Vec<(Vec<Resource>, bool)>>,
}

#[async_trait(?Send)]
impl HostService for FakeHost {
    async fn open_window(&self, resources: &[Resource], diff_mode: bool) {
        self.windows
            .borrow_mut()
            .push((resources.to_vec(), diff_mode));
    }
}

/// A scriptable editor input that logs its saves and reverts.
pub(crate) struct TestEditor {
    id: EditorId,
    name: String,
    resource: Option<Resource>,
    capabilities: Capabilities,
    dirty: Cell<bool>,
    stays_dirty: Cell<bool>,
    save_result: RefCell<Option<SavedEditor>>,
    log: Log,
    will_dispose: DisposeEmitter,
}

impl TestEditor {
    pub(crate) fn new(name: &str) -> Rc<Self> {
        Self::build(name, None, Capabilities::empty(), &Log::default())
    }

    pub(crate) fn build(
        name: &str,
        resource: Option<Resource>,
        capabilities: Capabilities,
        log: &Log,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: EditorId::next(),
            name: name.to_string(),
            resource,
            capabilities,
            dirty: Cell::new(false),
            stays_dirty: Cell::new(false),
            save_result: RefCell::new(Some(SavedEditor::Same)),
            log: log.clone(),
            will_dispose: DisposeEmitter::new(),
        })
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    /// Reverting reports success but leaves the editor dirty.
    pub(crate) fn set_stays_dirty(&self, stays_dirty: bool) {
        self.stays_dirty.set(stays_dirty);
    }

    pub(crate) fn set_save_result(&self, result: Option<SavedEditor>) {
        *self.save_result.borrow_mut() = result;
    }

    async fn do_save(&self, action: &str) -> Option<SavedEditor> {
        self.log.borrow_mut().push(format!("{action}:{}", self.name));
        tokio::task::yield_now().await;
        self.log.borrow_mut().push(format!("done:{}", self.name));
        let result = self.save_result.borrow().clone();
        if result.is_some() {
            self.dirty.set(false);
        }
        result
    }
}

#[async_trait(?Send)]
impl EditorInput for TestEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn type_id(&self) -> &'static str {
        "test.editor"
    }

    fn resource(&self) -> Option<Resource> {
        self.resource.clone()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn is_disposed(&self) -> bool {
        self.will_dispose.has_fired()
    }

    async fn save(&self, _group: GroupId, _options: &SaveOptions) -> Option<SavedEditor> {
        self.do_save("save").await
    }

    async fn save_as(&self, _group: GroupId, _options: &SaveOptions) -> Option<SavedEditor> {
        self.do_save("save_as").await
    }

    async fn revert(&self, _group: GroupId, _options: &RevertOptions) -> bool {
        self.log.borrow_mut().push(format!("revert:{}", self.name));
        if !self.stays_dirty.get() {
            self.dirty.set(false);
        }
        true
    }

    fn on_will_dispose(&self, listener: Box<dyn FnOnce()>) -> Subscription {
        self.will_dispose.subscribe(listener)
    }

    fn dispose(&self) {
        self.will_dispose.fire();
    }
}

impl fmt::Debug for TestEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEditor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An editor service over an in-memory part, with a `file:///proj` workspace.
pub(crate) struct Harness {
    pub(crate) service: EditorService,
    pub(crate) part: Rc<EditorPart>,
    pub(crate) files: Rc<FakeFiles>,
    pub(crate) working_copies: Rc<WorkingCopies>,
    pub(crate) untitled: Rc<UntitledBuffers>,
    pub(crate) resolver: Rc<FakeResolver>,
    pub(crate) trust: Rc<FakeTrust>,
    pub(crate) host: Rc<FakeHost>,
}

impl Harness {
    /// Deleted files are re-checked without waiting.
    pub(crate) fn new() -> Self {
        Self::with_settings(EditorSettings {
            delete_recheck_delay_ms: 0,
            ..EditorSettings::default()
        })
    }

    pub(crate) fn with_settings(settings: EditorSettings) -> Self {
        Self::build(settings, PathCasing::Sensitive)
    }

    pub(crate) fn build(settings: EditorSettings, casing: PathCasing) -> Self {
        let part = EditorPart::new();
        let files = Rc::new(FakeFiles::default());
        let working_copies = Rc::new(WorkingCopies::new());
        let untitled = Rc::new(UntitledBuffers::new());
        let resolver = Rc::new(FakeResolver::default());
        let trust = Rc::new(FakeTrust::default());
        let host = Rc::new(FakeHost::default());

        let service = EditorService::new(
            Collaborators {
                groups: part.clone(),
                files: files.clone(),
                working_copies: working_copies.clone(),
                untitled: untitled.clone(),
                resolver: resolver.clone(),
                trust: trust.clone(),
                host: host.clone(),
                policy: Rc::new(DefaultGroupPolicy),
                workspace: WorkspaceFolders::new(vec![resource("file:///proj")]),
                identity: Rc::new(UriIdentity::new(casing)),
            },
            settings,
        );

        Self {
            service,
            part,
            files,
            working_copies,
            untitled,
            resolver,
            trust,
            host,
        }
    }
}
