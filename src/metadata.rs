// src/metadata.rs

use crate::decode::RationalValue;
use crate::error::AppError;
use crate::tags::{TagKey, GPS_INFO_TAG};
use chrono::NaiveDateTime;
use exif::{Context, In, Reader, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decoded tag name -> raw value. Unknown identifiers stay under
/// [`TagKey::Raw`].
pub type MetadataTagMap = BTreeMap<TagKey, TagValue>;

/// GPS sub-block, still keyed by raw GPS identifiers.
pub type GpsTagMap = BTreeMap<u16, TagValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Bytes(Vec<u8>),
    Numbers(Vec<RationalValue>),
    Gps(GpsTagMap),
}

impl TagValue {
    /// Numeric components of the value, in order.
    pub fn components(&self) -> Vec<RationalValue> {
        match self {
            TagValue::Numbers(values) => values.clone(),
            TagValue::Bytes(bytes) => bytes.iter().map(|&b| RationalValue::Scalar(b as f64)).collect(),
            TagValue::Text(text) => vec![RationalValue::Text(text.clone())],
            TagValue::Gps(_) => Vec::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// False for empty strings, sequences and sub-blocks.
    pub fn is_truthy(&self) -> bool {
        match self {
            TagValue::Text(text) => !text.trim().is_empty(),
            TagValue::Bytes(bytes) => !bytes.is_empty(),
            TagValue::Numbers(values) => !values.is_empty(),
            TagValue::Gps(map) => !map.is_empty(),
        }
    }
}

/// Reads the embedded metadata of the image at `path`. Any failure to read
/// the block yields an empty map.
pub fn extract(path: &Path) -> MetadataTagMap {
    log::trace!("Extracting EXIF data for image: {:?}", path);
    match read_exif(path) {
        Ok(exif) => tag_map(&exif),
        Err(e) => {
            log::debug!("No EXIF data found for {:?}: {}", path, e);
            MetadataTagMap::new()
        }
    }
}

fn read_exif(path: &Path) -> Result<exif::Exif, AppError> {
    let file = File::open(path)?;
    let mut buf_reader = BufReader::new(file);
    Ok(Reader::new().read_from_container(&mut buf_reader)?)
}

/// Flattens the primary image's fields into a [`MetadataTagMap`], gathering
/// GPS fields into a nested block under `GPSInfo`.
pub fn tag_map(exif: &exif::Exif) -> MetadataTagMap {
    let mut tags = MetadataTagMap::new();
    let mut gps = GpsTagMap::new();

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let id = field.tag.number();
        let Some(value) = convert_value(&field.value) else {
            log::trace!("Skipping tag {} with unknown value type", field.tag);
            continue;
        };
        match field.tag.context() {
            Context::Gps => {
                gps.insert(id, value);
            }
            Context::Tiff if id == GPS_INFO_TAG => {}
            _ => {
                tags.insert(TagKey::exif(id), value);
            }
        }
    }

    if !gps.is_empty() {
        tags.insert(TagKey::exif(GPS_INFO_TAG), TagValue::Gps(gps));
    }
    tags
}

fn convert_value(value: &Value) -> Option<TagValue> {
    fn scalars<T: Copy + Into<f64>>(values: &[T]) -> TagValue {
        TagValue::Numbers(values.iter().map(|&v| RationalValue::Scalar(v.into())).collect())
    }

    let converted = match value {
        Value::Byte(bytes) => TagValue::Bytes(bytes.clone()),
        Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
        Value::Ascii(lines) => TagValue::Text(
            lines
                .iter()
                .map(|line| String::from_utf8_lossy(line).trim_end_matches('\0').to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Short(v) => scalars(v),
        Value::Long(v) => scalars(v),
        Value::SByte(v) => scalars(v),
        Value::SShort(v) => scalars(v),
        Value::SLong(v) => scalars(v),
        Value::Float(v) => scalars(v),
        Value::Double(v) => scalars(v),
        Value::Rational(v) => TagValue::Numbers(v.iter().map(|&r| r.into()).collect()),
        Value::SRational(v) => TagValue::Numbers(v.iter().map(|&r| r.into()).collect()),
        Value::Unknown(..) => return None,
    };
    Some(converted)
}

const CAPTURE_TIME_TAGS: [&str; 3] = ["DateTimeOriginal", "DateTimeDigitized", "DateTime"];

/// Capture time recorded by the camera, if any of the date tags parse.
pub fn capture_time(tags: &MetadataTagMap) -> Option<NaiveDateTime> {
    CAPTURE_TIME_TAGS.iter().find_map(|name| {
        let text = tags.get(&TagKey::Named(name))?.as_text()?;
        NaiveDateTime::parse_from_str(text.trim(), "%Y:%m:%d %H:%M:%S").ok()
    })
}
