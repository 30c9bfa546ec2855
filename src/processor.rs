use crate::error::AppError;
use crate::gps::{self, GpsInfo};
use crate::metadata;
use chrono::{DateTime, Local, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Marker shown for any display field without a value.
pub const UNAVAILABLE: &str = "Unavailable";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub gps: GpsInfo,
    /// Filesystem creation time.
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    /// Capture time embedded by the camera.
    pub captured: Option<NaiveDateTime>,
    pub size: Option<u64>,
    pub file_name: String,
    pub extension: Option<String>,
    pub content_type: Option<String>,
}

impl ImageRecord {
    /// Named fields for the metadata panel, always complete and in a fixed order.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let or_unavailable = |value: Option<String>| value.unwrap_or_else(|| UNAVAILABLE.to_string());
        let timestamp = |t: Option<NaiveDateTime>| or_unavailable(t.map(|t| t.format(TIMESTAMP_FORMAT).to_string()));

        vec![
            ("CreateDate", timestamp(self.created)),
            ("ModifyDate", timestamp(self.modified)),
            ("GPSLatitude", or_unavailable(self.gps.latitude.map(|c| c.to_string()))),
            ("GPSLongitude", or_unavailable(self.gps.longitude.map(|c| c.to_string()))),
            ("GPSAltitude", or_unavailable(self.gps.altitude.map(|a| format!("{a} m")))),
            ("ImageWidth", self.width.to_string()),
            ("ImageHeight", self.height.to_string()),
            ("FileName", self.file_name.clone()),
            ("FileSize", or_unavailable(self.size.map(|s| format!("{s} bytes")))),
            ("FileType", or_unavailable(self.content_type.clone())),
            ("FileExtension", or_unavailable(self.extension.clone())),
        ]
    }
}

/// Decodes the image at `path` and gathers everything known about it.
pub fn build_record(path: &Path) -> Result<ImageRecord, AppError> {
    log::trace!("Opening image: {:?}", path);
    let image = image::io::Reader::open(path)?.with_guessed_format()?.decode()?;
    let (width, height) = (image.width(), image.height());
    drop(image);
    log::debug!("Dimensions for {:?}: {}x{}", path, width, height);

    let tags = metadata::extract(path);
    let gps = gps::resolve(&tags);
    let captured = metadata::capture_time(&tags);
    log::trace!("GPS for {:?}: {:?}", path, gps);

    let (size, created, modified) = match fs::metadata(path) {
        Ok(meta) => (
            Some(meta.len()),
            meta.created().ok().map(local_time),
            meta.modified().ok().map(local_time),
        ),
        Err(e) => {
            log::warn!("Could not read file attributes for {:?}: {}", path, e);
            (None, None, None)
        }
    };

    let content_type = mime_guess::from_path(path).first();
    if let Some(guess) = content_type.as_ref().filter(|m| m.type_() != mime::IMAGE) {
        log::debug!("Extension of {:?} suggests non-image content type {}", path, guess);
    }

    Ok(ImageRecord {
        path: path.to_path_buf(),
        width,
        height,
        gps,
        created,
        modified,
        captured,
        size,
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        extension: path.extension().map(|e| e.to_string_lossy().into_owned()),
        content_type: content_type.map(|m| m.essence_str().to_string()),
    })
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Builds one record per path. Failures stay attached to their path and
/// never stop the rest of the batch; results keep the input order.
pub fn build_records(paths: &[PathBuf], parallel: bool) -> Vec<(PathBuf, Result<ImageRecord, AppError>)> {
    log::info!("Importing {} image(s)", paths.len());
    let process = |path: &PathBuf| {
        log::debug!("Processing image started for: {:?}", path);
        let result = build_record(path);
        if let Err(e) = &result {
            log::warn!("Failed to process image {:?}: {}", path, e);
        }
        (path.clone(), result)
    };

    if parallel {
        paths.par_iter().map(process).collect()
    } else {
        paths.iter().map(process).collect()
    }
}
