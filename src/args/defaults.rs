use std::path::PathBuf;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("poke/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_ENV_FILE: &str = ".env";

const HISTORY_FILE_NAME: &str = "tmp_poke_latest.json";

pub(crate) fn default_history_path() -> String {
    default_base_dir()
        .join(HISTORY_FILE_NAME)
        .to_string_lossy()
        .into_owned()
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = user_home_dir() {
        return home.join(".poke");
    }

    PathBuf::from(".poke")
}

fn user_home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        if let Some(value) = std::env::var_os("USERPROFILE") {
            return Some(PathBuf::from(value));
        }
        let drive = std::env::var_os("HOMEDRIVE");
        let path = std::env::var_os("HOMEPATH");
        if let (Some(drive), Some(path)) = (drive, path) {
            let mut full = PathBuf::from(drive);
            full.push(path);
            return Some(full);
        }
    }

    if let Some(value) = std::env::var_os("HOME") {
        return Some(PathBuf::from(value));
    }

    None
}
