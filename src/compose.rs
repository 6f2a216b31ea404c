use crate::alignment::HorizontalAlign;
use crate::analyzer::{
    check_overlay_fits, flatten_on_white, scaled_dimensions, Backdrop, ImageAnalyzer,
    DEFAULT_TOLERANCE,
};
use crate::assets::PlatformAssets;
use crate::buffer::{BufferTable, Placement};
use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use log::debug;

/// A logo stamped on top of the finished composite.
#[derive(Debug, Clone)]
pub struct LogoOverlay {
    pub image: RgbaImage,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

impl LogoOverlay {
    fn scaled_size(&self) -> Result<(u32, u32)> {
        scaled_dimensions(self.image.dimensions(), None, Some(self.height.max(1)))
    }
}

#[derive(Debug, Clone)]
pub struct ComposeOptions {
    pub tolerance: u8,
    pub backdrop: Backdrop,
    pub logo: Option<LogoOverlay>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            backdrop: Backdrop::White,
            logo: None,
        }
    }
}

/// Table lookup, unless the advanced `(buffer1, buffer2)` override is set.
pub fn resolve_placement(
    table: &BufferTable,
    product_type: &str,
    manual: Option<(i64, i64)>,
) -> Result<Placement> {
    match manual {
        Some((buffer1, buffer2)) => Placement::manual(buffer1, buffer2),
        None => table.lookup(product_type),
    }
}

/// Flatten, crop to content, resize to the target height and paste onto a
/// copy of `template`. Sizes are checked against the template before any
/// resizing happens.
pub fn compose(
    product: &DynamicImage,
    template: &RgbImage,
    align: HorizontalAlign,
    placement: Placement,
    options: &ComposeOptions,
) -> Result<RgbImage> {
    let flattened = flatten_on_white(product);
    let analyzer = ImageAnalyzer::from_rgb(flattened).with_tolerance(options.tolerance);
    let cropped = analyzer.crop_to_content(options.backdrop)?;

    let (width, height) = scaled_dimensions(cropped.dimensions(), None, Some(placement.target_height))?;
    let x = align.offset(width, template.width());
    let y = placement.top_offset;
    check_overlay_fits(template.dimensions(), (width, height), (x, y))?;

    let logo = match &options.logo {
        Some(logo) => {
            let size = logo.scaled_size()?;
            check_overlay_fits(template.dimensions(), size, (logo.x, logo.y))?;
            Some((logo, size))
        }
        None => None,
    };

    debug!(
        "Pasting {}x{} product at ({}, {}) on {}x{} template",
        width,
        height,
        x,
        y,
        template.width(),
        template.height()
    );
    let resized = imageops::resize(&cropped, width, height, FilterType::CatmullRom);
    let mut canvas = DynamicImage::ImageRgb8(template.clone()).to_rgba8();
    imageops::overlay(&mut canvas, &DynamicImage::ImageRgb8(resized).to_rgba8(), x, y);

    if let Some((logo, (logo_w, logo_h))) = logo {
        let scaled = imageops::resize(&logo.image, logo_w, logo_h, FilterType::CatmullRom);
        imageops::overlay(&mut canvas, &scaled, logo.x, logo.y);
    }

    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

pub fn compose_for_platform(
    product: &DynamicImage,
    assets: &PlatformAssets,
    placement: Placement,
    options: &ComposeOptions,
) -> Result<RgbImage> {
    compose(
        product,
        &assets.template,
        assets.spec.horizontal_align,
        placement,
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JunctionError;
    use image::{Rgb, Rgba};

    const TEMPLATE_GREY: Rgb<u8> = Rgb([120, 120, 120]);
    const PRODUCT_RED: Rgb<u8> = Rgb([200, 20, 20]);

    fn product_photo() -> DynamicImage {
        let mut img = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
        for y in 10..20 {
            for x in 10..30 {
                img.put_pixel(x, y, PRODUCT_RED);
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn template() -> RgbImage {
        RgbImage::from_pixel(100, 80, TEMPLATE_GREY)
    }

    #[test]
    fn test_compose_centres_product_at_offset() {
        let placement = Placement {
            top_offset: 5,
            target_height: 20,
        };
        let out = compose(
            &product_photo(),
            &template(),
            HorizontalAlign::Center,
            placement,
            &ComposeOptions::default(),
        )
        .unwrap();

        assert_eq!(out.dimensions(), (100, 80));
        // 20x10 content scaled to 40x20, centred: x = (100 - 40) / 2
        assert_eq!(*out.get_pixel(30, 5), PRODUCT_RED);
        assert_eq!(*out.get_pixel(69, 24), PRODUCT_RED);
        assert_eq!(*out.get_pixel(29, 5), TEMPLATE_GREY);
        assert_eq!(*out.get_pixel(70, 5), TEMPLATE_GREY);
        assert_eq!(*out.get_pixel(30, 25), TEMPLATE_GREY);
    }

    #[test]
    fn test_transparent_png_is_flattened_before_cropping() {
        let mut img = RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 0]));
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, Rgba([20, 200, 20, 255]));
            }
        }
        let out = compose(
            &DynamicImage::ImageRgba8(img),
            &template(),
            HorizontalAlign::Left,
            Placement {
                top_offset: 0,
                target_height: 10,
            },
            &ComposeOptions::default(),
        )
        .unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([20, 200, 20]));
        assert_eq!(*out.get_pixel(10, 0), TEMPLATE_GREY);
    }

    #[test]
    fn test_product_taller_than_template_fails() {
        let err = compose(
            &product_photo(),
            &template(),
            HorizontalAlign::Center,
            Placement {
                top_offset: 0,
                target_height: 81,
            },
            &ComposeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn test_huge_table_height_is_rejected_before_resizing() {
        let table = BufferTable::parse("product,buffer1,buffer2\nBig,0,1e12\n").unwrap();
        let placement = table.lookup("Big").unwrap();
        assert_eq!(placement.target_height, u32::MAX);

        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        img.put_pixel(4, 4, Rgb([0, 0, 0]));
        let err = compose(
            &DynamicImage::ImageRgb8(img),
            &RgbImage::from_pixel(100, 100, TEMPLATE_GREY),
            HorizontalAlign::Center,
            placement,
            &ComposeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn test_far_table_offset_is_rejected() {
        let table = BufferTable::parse("product,buffer1,buffer2\nFar,1e30,5\n").unwrap();
        let err = compose(
            &product_photo(),
            &template(),
            HorizontalAlign::Left,
            table.lookup("Far").unwrap(),
            &ComposeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn test_thin_strip_wider_than_template_fails() {
        let mut img = RgbImage::from_pixel(3000, 3, Rgb([255, 255, 255]));
        for x in 0..3000 {
            img.put_pixel(x, 1, PRODUCT_RED);
        }
        let err = compose(
            &DynamicImage::ImageRgb8(img),
            &template(),
            HorizontalAlign::Left,
            Placement {
                top_offset: 0,
                target_height: 4000,
            },
            &ComposeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn test_oversized_logo_fails() {
        let options = ComposeOptions {
            logo: Some(LogoOverlay {
                image: RgbaImage::from_pixel(100, 1, Rgba([0, 0, 255, 255])),
                height: 1000,
                x: 10,
                y: 10,
            }),
            ..ComposeOptions::default()
        };
        let err = compose(
            &product_photo(),
            &template(),
            HorizontalAlign::Center,
            Placement {
                top_offset: 5,
                target_height: 20,
            },
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::OverlayOutOfBounds { .. }));
    }

    #[test]
    fn test_blank_upload_fails() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([255, 255, 255])));
        let err = compose(
            &blank,
            &template(),
            HorizontalAlign::Center,
            Placement {
                top_offset: 0,
                target_height: 10,
            },
            &ComposeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, JunctionError::BlankImage { .. }));
    }

    #[test]
    fn test_logo_is_stamped_last() {
        let options = ComposeOptions {
            logo: Some(LogoOverlay {
                image: RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255])),
                height: 5,
                x: 90,
                y: 70,
            }),
            ..ComposeOptions::default()
        };
        let out = compose(
            &product_photo(),
            &template(),
            HorizontalAlign::Center,
            Placement {
                top_offset: 5,
                target_height: 20,
            },
            &options,
        )
        .unwrap();
        assert_eq!(*out.get_pixel(90, 70), Rgb([0, 0, 255]));
        assert_eq!(*out.get_pixel(94, 74), Rgb([0, 0, 255]));
        assert_eq!(*out.get_pixel(95, 70), TEMPLATE_GREY);
    }

    #[test]
    fn test_resolve_placement_prefers_manual() {
        let table = BufferTable::parse("product,buffer1,buffer2\nBag,5,30\n").unwrap();
        assert_eq!(resolve_placement(&table, "Bag", None).unwrap().top_offset, 5);
        let manual = resolve_placement(&table, "Unlisted", Some((12, 64))).unwrap();
        assert_eq!(
            manual,
            Placement {
                top_offset: 12,
                target_height: 64
            }
        );
        assert!(resolve_placement(&table, "Unlisted", None).is_err());
    }
}
