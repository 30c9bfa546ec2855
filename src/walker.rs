use crate::config::AppConfig;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Turns command-line inputs into image paths. Files pass through as given;
/// directories contribute their files with an allowed extension.
pub fn expand_inputs(inputs: &[PathBuf], config: &AppConfig) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(walk_directory(input, config)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn walk_directory(dir: &Path, config: &AppConfig) -> Result<Vec<PathBuf>, AppError> {
    log::info!("Starting file discovery in {:?}", dir);
    log::debug!("Configured allowed extensions: {:?}", config.allowed_extensions);

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself being unreadable is a real error.
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if config.allowed_extensions.contains(&ext.to_lowercase()) => {
                log::debug!("Found image file: {:?}", path);
                found.push(path.to_path_buf());
            }
            Some(_) => log::trace!("Skipping file due to unsupported extension: {:?}", path),
            None => log::trace!("Skipping file with no extension: {:?}", path),
        }
    }

    log::info!("File discovery complete, {} file(s) found.", found.len());
    Ok(found)
}
