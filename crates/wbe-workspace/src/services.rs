//! Collaborators the editor service depends on but does not own.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use wbe_source::Resource;
use wbe_source::UriIdentity;

use crate::dispose::Subscription;
use crate::error::EditorError;
use crate::input::RevertOptions;
use crate::input::SaveOptions;

#[async_trait(?Send)]
pub trait FileService {
    fn can_handle_resource(&self, resource: &Resource) -> bool;

    async fn exists(&self, resource: &Resource) -> bool;

    /// Watch a single resource until the returned subscription is dropped.
    fn watch(&self, resource: &Resource) -> Subscription;
}

/// Dirty state and persistence of documents that have a backing file.
#[async_trait(?Send)]
pub trait WorkingCopyService {
    /// Whether a working copy exists for `resource`, dirty or not.
    fn has(&self, resource: &Resource) -> bool;

    fn is_dirty(&self, resource: &Resource) -> bool;

    /// `false` when the save failed or was declined.
    async fn save(&self, resource: &Resource, options: &SaveOptions) -> bool;

    /// The resource the document was written to, `None` when cancelled.
    async fn save_as(&self, resource: &Resource, options: &SaveOptions) -> Option<Resource>;

    async fn revert(&self, resource: &Resource, options: &RevertOptions) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrustResponse {
    Open,
    OpenInNewWindow,
    Cancel,
}

#[async_trait(?Send)]
pub trait WorkspaceTrust {
    async fn request_open_files_trust(&self, resources: &[Resource]) -> TrustResponse;
}

/// Trusts everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrustAll;

#[async_trait(?Send)]
impl WorkspaceTrust for TrustAll {
    async fn request_open_files_trust(&self, _resources: &[Resource]) -> TrustResponse {
        TrustResponse::Open
    }
}

#[async_trait(?Send)]
pub trait HostService {
    async fn open_window(&self, resources: &[Resource], diff_mode: bool);
}

/// A host without windows: requests for a new window are logged and dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessHost;

#[async_trait(?Send)]
impl HostService for HeadlessHost {
    async fn open_window(&self, resources: &[Resource], diff_mode: bool) {
        tracing::info!(
            count = resources.len(),
            diff_mode,
            "no window host available, ignoring request to open a new window"
        );
    }
}

/// How to create an untitled model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UntitledOptions {
    /// Reuse or create the model with exactly this `untitled:` resource.
    pub untitled_resource: Option<Resource>,
    /// The file the buffer will be saved to without asking.
    pub associated_resource: Option<Resource>,
    pub mode: Option<String>,
    pub initial_value: Option<String>,
    pub encoding: Option<String>,
}

/// A buffer without a backing file.
#[async_trait(?Send)]
pub trait UntitledModel: fmt::Debug {
    fn resource(&self) -> Resource;

    fn name(&self) -> String;

    fn associated_resource(&self) -> Option<Resource>;

    fn is_dirty(&self) -> bool;

    /// Write the buffer somewhere. Returns where, or `None` when cancelled.
    async fn save(&self, options: &SaveOptions) -> Option<Resource>;

    async fn revert(&self) -> bool;

    fn dispose(&self);
}

pub trait UntitledModels {
    fn create(&self, options: UntitledOptions) -> Result<Rc<dyn UntitledModel>, EditorError>;
}

/// Root folders of the open workspace.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceFolders {
    roots: Vec<Resource>,
}

impl WorkspaceFolders {
    pub fn new(roots: Vec<Resource>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Resource] {
        &self.roots
    }

    pub fn contains(&self, identity: &UriIdentity, resource: &Resource) -> bool {
        self.roots
            .iter()
            .any(|root| identity.is_equal_or_parent(resource, root))
    }
}
