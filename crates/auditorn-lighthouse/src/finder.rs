use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Locates the `lighthouse` command-line binary
pub struct LighthouseFinder {
    custom_path: Option<PathBuf>,
}

impl LighthouseFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find Lighthouse, checking the custom path first, then `PATH`
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_executable(path, "Lighthouse");
        }

        which::which("lighthouse").map_err(|_| {
            Error::NotFound(
                "Lighthouse not found on PATH. Install it with `npm install -g lighthouse` \
                 or use --lighthouse-path to specify location."
                    .to_string(),
            )
        })
    }
}

/// Locates a Chrome binary for Lighthouse to drive
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find Chrome binary, checking custom path first, then platform defaults
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_executable(path, "Chrome");
        }

        for path in Self::default_paths() {
            if let Ok(valid_path) = validate_executable(&path, "Chrome") {
                return Ok(valid_path);
            }
        }

        Err(Error::NotFound(format!(
            "Chrome not found. Checked: {}. Use --chrome-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }
}

/// Check that a path exists and is executable
fn validate_executable(path: &Path, what: &str) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "{} not found at: {}",
            what,
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path)?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::NotFound(format!(
                "{} binary not executable: {}",
                what,
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}
