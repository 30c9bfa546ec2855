// Fixture builders shared by the unit tests.
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;
use std::path::Path;

pub fn rational(num: u32, denom: u32) -> Rational {
    Rational { num, denom }
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn dms((d, m, s): (u32, u32, u32)) -> Value {
    Value::Rational(vec![rational(d, 1), rational(m, 1), rational(s, 1)])
}

pub fn field(tag: Tag, value: Value) -> Field {
    Field { tag, ifd_num: In::PRIMARY, value }
}

pub fn gps_fields(lat: (u32, u32, u32), lat_ref: &str, lon: (u32, u32, u32), lon_ref: &str) -> Vec<Field> {
    vec![
        field(Tag::GPSLatitudeRef, ascii(lat_ref)),
        field(Tag::GPSLatitude, dms(lat)),
        field(Tag::GPSLongitudeRef, ascii(lon_ref)),
        field(Tag::GPSLongitude, dms(lon)),
    ]
}

pub fn date_time_original(text: &str) -> Field {
    field(Tag::DateTimeOriginal, ascii(text))
}

/// Serializes `fields` into a big-endian TIFF block.
pub fn tiff_bytes(fields: &[Field]) -> Vec<u8> {
    let software = field(Tag::Software, ascii("photo_route"));
    let mut writer = Writer::new();
    writer.push_field(&software);
    for f in fields {
        writer.push_field(f);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(path).unwrap();
}

/// Writes an 8x6 JPEG with `fields` embedded in an APP1 segment.
pub fn write_jpeg_with_exif(path: &Path, fields: &[Field]) {
    image::RgbImage::new(8, 6).save_with_format(path, image::ImageFormat::Jpeg).unwrap();
    let jpeg = std::fs::read(path).unwrap();
    let tiff = tiff_bytes(fields);

    let len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + len as usize + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

pub fn write_corrupt(path: &Path) {
    std::fs::write(path, b"\xFF\xD8\xFF\xE0 truncated").unwrap();
}
