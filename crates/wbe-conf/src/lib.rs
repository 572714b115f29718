use std::path::Path;
use std::time::Duration;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub editor: EditorSettings,
}

/// The `[editor]` table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EditorSettings {
    /// Close clean editors whose file was deleted outside the application.
    pub close_on_file_delete: bool,
    /// Prefer a group that already shows an editor over the active group.
    pub reveal_if_open: bool,
    /// Wait before re-checking that an externally deleted file is gone.
    pub delete_recheck_delay_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            close_on_file_delete: false,
            reveal_if_open: false,
            delete_recheck_delay_ms: 100,
        }
    }
}

impl EditorSettings {
    #[must_use]
    pub fn delete_recheck_delay(&self) -> Duration {
        Duration::from_millis(self.delete_recheck_delay_ms)
    }
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("dev", "wbe", "wbe")
            .map(|proj_dirs| proj_dirs.config_dir().join("wbe.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!(path = %path.display(), "adding user configuration source");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".wbe.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("wbe.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, Settings::default());
            assert!(!settings.editor.close_on_file_delete);
            assert_eq!(
                settings.editor.delete_recheck_delay(),
                Duration::from_millis(100)
            );
        }

        #[test]
        fn test_partial_editor_table_keeps_other_defaults() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("wbe.toml"),
                "[editor]\nclose_on_file_delete = true\n",
            )
            .unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.editor.close_on_file_delete);
            assert!(!settings.editor.reveal_if_open);
            assert_eq!(settings.editor.delete_recheck_delay_ms, 100);
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_wbe_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("wbe.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_load_dot_wbe_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join(".wbe.toml"),
                "[editor]\ndelete_recheck_delay_ms = 250\n",
            )
            .unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(
                settings.editor.delete_recheck_delay(),
                Duration::from_millis(250)
            );
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_project_priority_wbe_overrides_dot_wbe() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join(".wbe.toml"),
                "[editor]\nreveal_if_open = false\n",
            )
            .unwrap();
            fs::write(
                dir.path().join("wbe.toml"),
                "[editor]\nreveal_if_open = true\n",
            )
            .unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.editor.reveal_if_open); // wbe.toml wins
        }

        #[test]
        fn test_user_priority_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("wbe.toml");
            fs::write(
                &user_conf_path,
                "debug = true\n[editor]\nclose_on_file_delete = true\n",
            )
            .unwrap();
            fs::write(
                project_dir.path().join(".wbe.toml"),
                "[editor]\nclose_on_file_delete = false\n",
            )
            .unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(settings.debug); // untouched by the project
            assert!(!settings.editor.close_on_file_delete); // project wins
        }

        #[test]
        fn test_missing_user_config_file_is_ignored() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("wbe.toml");
            fs::write(project_dir.path().join("wbe.toml"), "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(settings.debug);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("wbe.toml"), "debug = not_a_boolean").unwrap();
            let result = Settings::load_from_paths(dir.path(), None);
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }

        #[test]
        fn test_wrong_type_for_editor_key() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("wbe.toml"),
                "[editor]\ndelete_recheck_delay_ms = \"soon\"\n",
            )
            .unwrap();
            assert!(Settings::load_from_paths(dir.path(), None).is_err());
        }
    }
}
