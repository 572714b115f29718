use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use wbe_conf::Settings;
use wbe_source::PathCasing;
use wbe_source::Resource;
use wbe_source::UriIdentity;
use wbe_source::Utf8PathClean;
use wbe_workspace::Collaborators;
use wbe_workspace::DefaultGroupPolicy;
use wbe_workspace::EditorGroup;
use wbe_workspace::EditorGroups;
use wbe_workspace::EditorInput;
use wbe_workspace::EditorPart;
use wbe_workspace::EditorService;
use wbe_workspace::EditorsOrder;
use wbe_workspace::FileChangesEvent;
use wbe_workspace::GroupsOrder;
use wbe_workspace::HeadlessHost;
use wbe_workspace::NoOverrides;
use wbe_workspace::OpenEditorsOptions;
use wbe_workspace::OpenRequest;
use wbe_workspace::OsFileService;
use wbe_workspace::PreferredGroup;
use wbe_workspace::TrustAll;
use wbe_workspace::UntitledBuffers;
use wbe_workspace::UntypedEditor;
use wbe_workspace::WorkingCopies;
use wbe_workspace::WorkspaceFolders;

use crate::args::Output;
use crate::commands::resolve_project_root;
use crate::commands::Command;
use crate::logging;

#[derive(Debug, Parser)]
pub struct Open {
    /// Files to open, relative to the current directory.
    #[arg(required = true)]
    paths: Vec<Utf8PathBuf>,

    /// Open the files in a group to the side.
    #[arg(long)]
    side: bool,

    /// Compare two files in a diff editor.
    #[arg(long, conflicts_with = "side")]
    diff: bool,

    /// Print the open editors and exit instead of following file changes.
    #[arg(long)]
    no_watch: bool,
}

impl Command for Open {
    async fn execute(&self, output: Output) -> Result<ExitCode> {
        let root = resolve_project_root()?;
        let settings = Settings::new(root.as_std_path()).context("Failed to load settings")?;
        let _guard = logging::init_tracing(output, settings.debug);

        let requests = self.requests(&root)?;
        let workspace = Resource::file(&root).context("Invalid project root")?;

        let (files, changes) = OsFileService::new();
        let files = Rc::new(files);
        let service = Rc::new(EditorService::new(
            Collaborators {
                groups: EditorPart::new(),
                files: files.clone(),
                working_copies: Rc::new(WorkingCopies::new()),
                untitled: Rc::new(UntitledBuffers::new()),
                resolver: Rc::new(NoOverrides),
                trust: Rc::new(TrustAll),
                host: Rc::new(HeadlessHost),
                policy: Rc::new(DefaultGroupPolicy),
                workspace: WorkspaceFolders::new(vec![workspace.clone()]),
                identity: Rc::new(UriIdentity::new(PathCasing::platform())),
            },
            settings.editor,
        ));
        service.start().await;

        let group = self.side.then_some(PreferredGroup::Side);
        let panes = service
            .open_editors(requests, group, OpenEditorsOptions::default())
            .await
            .context("Failed to open editors")?;
        tracing::info!(groups = panes.len(), editors = service.count(), "opened");

        if output.prints() {
            print_editors(&service);
        }
        if self.no_watch {
            service.dispose();
            return Ok(ExitCode::SUCCESS);
        }

        // Editors outside the project are watched by the service itself.
        let project_watch = files.watch_folder(&workspace);
        let pump = tokio::task::spawn_local(follow_changes(service.clone(), changes));
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        pump.abort();
        drop(project_watch);

        if output.prints() {
            print_editors(&service);
        }
        service.dispose();
        Ok(ExitCode::SUCCESS)
    }
}

impl Open {
    fn requests(&self, root: &Utf8Path) -> Result<Vec<OpenRequest>> {
        let resources = self
            .paths
            .iter()
            .map(|path| {
                let absolute = if path.is_relative() {
                    root.join(path)
                } else {
                    path.clone()
                };
                Resource::file(absolute.clean()).with_context(|| format!("Cannot open '{path}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        if self.diff {
            let [original, modified] = resources.as_slice() else {
                anyhow::bail!("--diff needs exactly two files, got {}", resources.len());
            };
            let diff = UntypedEditor::diff(
                UntypedEditor::resource(original.clone()),
                UntypedEditor::resource(modified.clone()),
            );
            return Ok(vec![OpenRequest::new(diff)]);
        }

        Ok(resources
            .into_iter()
            .map(|resource| OpenRequest::new(UntypedEditor::resource(resource)))
            .collect())
    }
}

async fn follow_changes(
    service: Rc<EditorService>,
    mut changes: UnboundedReceiver<FileChangesEvent>,
) {
    while let Some(event) = changes.recv().await {
        tracing::debug!(changes = event.changes().len(), "file changes observed");
        service.handle_files_change(&event).await;
        tracing::info!(editors = service.count(), "reconciled");
    }
}

fn print_editors(service: &EditorService) {
    let active = service.active_editor().map(|editor| editor.id());
    for group in service.groups().groups(GroupsOrder::CreationTime) {
        println!("{}", group.id());
        for editor in group.editors(EditorsOrder::Sequential) {
            let marker = if Some(editor.id()) == active { '*' } else { ' ' };
            let location = editor
                .resource()
                .map_or_else(|| "-".to_string(), |resource| resource.to_string());
            println!("  {marker} {}  {location}", editor.name());
        }
    }
}
