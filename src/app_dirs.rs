use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("skitter"),
            )
        } else {
            ProjectDirs::from("", "", "skitter")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn records_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("records.txt"))
    }

    pub fn session_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("log.csv"))
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Some(pd) = ProjectDirs::from("", "", "skitter") {
            Some(pd.config_dir().join("config.json"))
        } else {
            Self::state_dir().map(|dir| dir.join("config.json"))
        }
    }
}
