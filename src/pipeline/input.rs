//! Input resolution: validate the FRD path and enumerate screenshots.
//!
//! Both checks run before any extraction or network call so a typo in a path
//! fails the run immediately. The PDF magic bytes (`%PDF`) are verified here
//! so callers get a meaningful error rather than a pdfium failure.

use crate::error::HelpGenError;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions treated as screenshots (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One logical UI view, identified by its screenshot's filename stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    /// Filename without extension, e.g. `Customer_Profile`.
    pub name: String,
    /// Full path to the screenshot.
    pub image_path: PathBuf,
}

/// Validate that `path` exists, is readable, and starts with the PDF magic bytes.
pub fn resolve_pdf(path: &Path) -> Result<PathBuf, HelpGenError> {
    if !path.is_file() {
        return Err(HelpGenError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(HelpGenError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(HelpGenError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(HelpGenError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved FRD PDF: {}", path.display());
    Ok(path.to_path_buf())
}

/// Fail unless `dir` is an existing directory.
pub fn require_screenshot_dir(dir: &Path) -> Result<(), HelpGenError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(HelpGenError::DirectoryNotFound {
            path: dir.to_path_buf(),
        })
    }
}

/// List the screens in `dir`, sorted by file name.
///
/// Only regular files with a `.png`, `.jpg` or `.jpeg` extension (any case)
/// are kept; everything else in the directory is ignored. Subdirectories are
/// not searched.
pub fn discover_screens(dir: &Path) -> Result<Vec<Screen>, HelpGenError> {
    require_screenshot_dir(dir)?;

    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => HelpGenError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => HelpGenError::DirectoryNotFound {
            path: dir.to_path_buf(),
        },
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_path(p))
        .collect();
    paths.sort();

    let screens: Vec<Screen> = paths
        .into_iter()
        .filter_map(|image_path| {
            let name = image_path.file_stem()?.to_string_lossy().into_owned();
            Some(Screen { name, image_path })
        })
        .collect();

    debug!("Found {} screenshots in {}", screens.len(), dir.display());
    Ok(screens)
}

/// True when the path carries one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
