//! Local file system access and per-file watching through `notify`.

use std::fmt;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use notify::event::ModifyKind;
use notify::event::RenameMode;
use notify::Config;
use notify::Event;
use notify::EventKind;
use notify::RecommendedWatcher;
use notify::RecursiveMode;
use notify::Watcher;
use tokio::sync::mpsc;
use wbe_source::Resource;

use crate::dispose::Subscription;
use crate::events::FileChange;
use crate::events::FileChangeType;
use crate::events::FileChangesEvent;
use crate::services::FileService;

/// A [`FileService`] over the local disk.
///
/// Every watch runs its own `notify` watcher. Observed changes are delivered
/// as [`FileChangesEvent`]s on the channel returned by [`OsFileService::new`].
pub struct OsFileService {
    events: mpsc::UnboundedSender<FileChangesEvent>,
}

impl OsFileService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FileChangesEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    /// Watch a folder and everything below it.
    pub fn watch_folder(&self, resource: &Resource) -> Subscription {
        self.start_watch(resource, RecursiveMode::Recursive)
    }

    fn start_watch(&self, resource: &Resource, mode: RecursiveMode) -> Subscription {
        let Some(path) = resource.to_file_path() else {
            tracing::debug!(resource = %resource, "not a local path, nothing to watch");
            return Subscription::empty();
        };

        let events = self.events.clone();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(changes) = convert_notify_event(event) {
                        let _ = events.send(changes);
                    }
                }
                Err(error) => tracing::warn!(%error, "file watcher error"),
            },
            Config::default(),
        );
        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(error) => {
                tracing::warn!(%error, path = %path, "failed to create file watcher");
                return Subscription::empty();
            }
        };
        if let Err(error) = watcher.watch(path.as_std_path(), mode) {
            tracing::warn!(%error, path = %path, "failed to watch path");
            return Subscription::empty();
        }

        tracing::debug!(path = %path, "watching");
        Subscription::new(move || {
            tracing::debug!(path = %path, "stopped watching");
            drop(watcher);
        })
    }
}

#[async_trait(?Send)]
impl FileService for OsFileService {
    fn can_handle_resource(&self, resource: &Resource) -> bool {
        resource.is_file()
    }

    async fn exists(&self, resource: &Resource) -> bool {
        match resource.to_file_path() {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    fn watch(&self, resource: &Resource) -> Subscription {
        self.start_watch(resource, RecursiveMode::NonRecursive)
    }
}

impl fmt::Debug for OsFileService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsFileService").finish_non_exhaustive()
    }
}

/// Convert a [`notify::Event`] into a [`FileChangesEvent`].
///
/// Renames become a deletion of the old path and an addition of the new one.
fn convert_notify_event(event: Event) -> Option<FileChangesEvent> {
    let paths: Vec<Utf8PathBuf> = event
        .paths
        .into_iter()
        .filter_map(|path| Utf8PathBuf::try_from(path).ok())
        .collect();

    let mut changes = Vec::new();
    let mut push = |path: &Utf8PathBuf, kind: FileChangeType| {
        if let Ok(resource) = Resource::file(path) {
            changes.push(FileChange { resource, kind });
        }
    };

    match event.kind {
        EventKind::Create(_) => paths.iter().for_each(|path| push(path, FileChangeType::Added)),
        EventKind::Remove(_) => paths
            .iter()
            .for_each(|path| push(path, FileChangeType::Deleted)),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths
            .iter()
            .for_each(|path| push(path, FileChangeType::Deleted)),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.iter().for_each(|path| push(path, FileChangeType::Added));
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [from, to] = paths.as_slice() {
                push(from, FileChangeType::Deleted);
                push(to, FileChangeType::Added);
            }
        }
        EventKind::Modify(_) => paths
            .iter()
            .for_each(|path| push(path, FileChangeType::Updated)),
        _ => {}
    }

    if changes.is_empty() {
        None
    } else {
        Some(FileChangesEvent::new(changes))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use notify::event::CreateKind;
    use notify::event::RemoveKind;
    use tempfile::tempdir;

    use super::*;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[cfg(not(windows))]
    #[test]
    fn test_convert_remove_and_create() {
        let removed = convert_notify_event(event(
            EventKind::Remove(RemoveKind::File),
            &["/proj/a.ts"],
        ))
        .unwrap();
        assert_eq!(
            removed.changes(),
            [FileChange {
                resource: Resource::parse("file:///proj/a.ts").unwrap(),
                kind: FileChangeType::Deleted,
            }]
        );

        let created =
            convert_notify_event(event(EventKind::Create(CreateKind::File), &["/proj/b.ts"]))
                .unwrap();
        assert_eq!(created.changes()[0].kind, FileChangeType::Added);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_convert_rename_both() {
        let renamed = convert_notify_event(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/proj/a.ts", "/proj/b.ts"],
        ))
        .unwrap();
        let kinds: Vec<_> = renamed.changes().iter().map(|change| change.kind).collect();
        assert_eq!(kinds, [FileChangeType::Deleted, FileChangeType::Added]);
    }

    #[test]
    fn test_ignored_event_kinds() {
        assert!(convert_notify_event(event(EventKind::Any, &["/proj/a.ts"])).is_none());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("a.txt")).unwrap();
        let resource = Resource::file(&path).unwrap();
        let (files, _events) = OsFileService::new();

        assert!(!files.exists(&resource).await);
        fs::write(&path, "hello").unwrap();
        assert!(files.exists(&resource).await);
        assert!(!files.exists(&Resource::untitled("Untitled-1").unwrap()).await);
    }

    #[test]
    fn test_watch_non_file_resource_is_inert() {
        let (files, _events) = OsFileService::new();
        let subscription = files.watch(&Resource::untitled("Untitled-1").unwrap());
        drop(subscription);
        assert!(!files.can_handle_resource(&Resource::untitled("Untitled-1").unwrap()));
    }
}
