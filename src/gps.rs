use crate::decode::{decode_coordinate, decode_rational, round_to, Coordinate};
use crate::metadata::{GpsTagMap, MetadataTagMap, TagValue};
use crate::tags::TagKey;
use serde::Serialize;
use std::collections::HashMap;

/// Position read from the GPS sub-block. Each field is `None` when it is
/// unavailable, independently of the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpsInfo {
    pub latitude: Option<Coordinate>,
    pub longitude: Option<Coordinate>,
    pub altitude: Option<f64>,
}

impl GpsInfo {
    /// Both coordinates, when both are available.
    pub fn position(&self) -> Option<(Coordinate, Coordinate)> {
        Some((self.latitude?, self.longitude?))
    }
}

pub fn resolve(metadata: &MetadataTagMap) -> GpsInfo {
    let Some(TagValue::Gps(block)) = metadata.get(&TagKey::Named("GPSInfo")) else {
        log::trace!("No GPSInfo block present");
        return GpsInfo::default();
    };
    let gps = named(block);

    GpsInfo {
        latitude: coordinate(&gps, "GPSLatitude", "GPSLatitudeRef"),
        longitude: coordinate(&gps, "GPSLongitude", "GPSLongitudeRef"),
        altitude: altitude(&gps),
    }
}

fn named(block: &GpsTagMap) -> HashMap<TagKey, &TagValue> {
    block.iter().map(|(&id, value)| (TagKey::gps(id), value)).collect()
}

fn coordinate(gps: &HashMap<TagKey, &TagValue>, value_tag: &'static str, ref_tag: &'static str) -> Option<Coordinate> {
    let value = gps.get(&TagKey::Named(value_tag)).filter(|v| v.is_truthy())?;
    let reference = gps.get(&TagKey::Named(ref_tag)).filter(|v| v.is_truthy())?;
    let Some(reference) = reference.as_text() else {
        log::trace!("{ref_tag} is not text: {reference:?}");
        return None;
    };
    let decoded = decode_coordinate(&value.components(), reference);
    if decoded.is_none() {
        log::trace!("Could not decode {value_tag} from {value:?}");
    }
    decoded
}

fn altitude(gps: &HashMap<TagKey, &TagValue>) -> Option<f64> {
    let value = gps.get(&TagKey::Named("GPSAltitude"))?;
    let first = value.components().into_iter().next()?;
    let metres = round_to(decode_rational(&first), 2);

    let below_sea_level = gps
        .get(&TagKey::Named("GPSAltitudeRef"))
        .and_then(|r| r.components().into_iter().next())
        .is_some_and(|r| decode_rational(&r) == 1.0);
    Some(if below_sea_level { -metres } else { metres })
}
