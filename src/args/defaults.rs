use std::path::PathBuf;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("pingreport/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_LOG_FILE: &str = "response_log.txt";

pub(crate) fn default_charts_path() -> String {
    default_base_dir()
        .join("charts")
        .to_string_lossy()
        .into_owned()
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = user_home_dir() {
        return home.join(".pingreport");
    }

    PathBuf::from(".pingreport")
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

    std::env::var_os("HOME").map(PathBuf::from)
}
