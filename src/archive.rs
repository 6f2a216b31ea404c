use crate::error::{JunctionError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use log::{debug, info};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "Result_Images.zip";
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgb8,
    )?;
    Ok(bytes)
}

fn entry_name(original_name: &str, suffix: &str, taken: &mut HashSet<String>) -> String {
    let base = format!("{}_{}", original_name, suffix);
    let mut name = format!("{}.jpg", base);
    let mut n = 2;
    while taken.contains(&name) {
        name = format!("{} ({}).jpg", base, n);
        n += 1;
    }
    taken.insert(name.clone());
    name
}

/// ZIP of one JPEG per result, named `{original_name}_{suffix}.jpg`.
pub fn build_archive<'a, I>(results: I, suffix: &str, quality: u8) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a RgbImage)>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut taken = HashSet::new();

    for (original_name, image) in results {
        let name = entry_name(original_name, suffix, &mut taken);
        let jpeg = encode_jpeg(image, quality)?;
        debug!("Archiving {} ({} bytes)", name, jpeg.len());
        writer.start_file(name, options)?;
        writer.write_all(&jpeg)?;
    }

    if taken.is_empty() {
        return Err(JunctionError::EmptyArchive);
    }

    let bytes = writer.finish()?.into_inner();
    info!("Built archive with {} images ({} bytes)", taken.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Read;

    #[test]
    fn test_archive_names_and_contents() {
        let a = RgbImage::from_pixel(30, 20, Rgb([10, 120, 200]));
        let b = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let bytes = build_archive(
            vec![("shoe.png", &a), ("bag.jpg", &b), ("shoe.png", &b)],
            "LuckyDigital",
            90,
        )
        .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(String::from).collect();
        assert_eq!(archive.len(), 3);
        assert!(names.contains(&"shoe.png_LuckyDigital.jpg".to_string()));
        assert!(names.contains(&"bag.jpg_LuckyDigital.jpg".to_string()));
        assert!(names.contains(&"shoe.png_LuckyDigital (2).jpg".to_string()));

        let mut entry = archive.by_name("shoe.png_LuckyDigital.jpg").unwrap();
        let mut jpeg = Vec::new();
        entry.read_to_end(&mut jpeg).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn test_empty_archive_is_an_error() {
        let nothing: Vec<(&str, &RgbImage)> = Vec::new();
        assert!(matches!(
            build_archive(nothing, "Jingjungto", 75),
            Err(JunctionError::EmptyArchive)
        ));
    }
}
