use crate::error::{JunctionError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use log::debug;
use std::path::Path;

pub const DEFAULT_TOLERANCE: u8 = 10;

const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Colour treated as "empty" when searching for content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backdrop {
    #[default]
    White,
    Black,
}

impl Backdrop {
    pub fn label(self) -> &'static str {
        match self {
            Backdrop::White => "white",
            Backdrop::Black => "black",
        }
    }
}

/// Inclusive pixel coordinates of the content found in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Horizontal,
    Vertical,
}

impl std::str::FromStr for Layout {
    type Err = JunctionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" => Ok(Layout::Horizontal),
            "vertical" => Ok(Layout::Vertical),
            _ => Err(JunctionError::InvalidLayout(s.to_string())),
        }
    }
}

/// An RGB bitmap plus the tolerance used to decide what counts as backdrop.
#[derive(Debug, Clone)]
pub struct ImageAnalyzer {
    image: RgbImage,
    tolerance: u8,
}

impl ImageAnalyzer {
    /// Alpha is discarded, so transparent inputs should go through
    /// [`flatten_on_white`] first.
    pub fn new(image: DynamicImage) -> Self {
        Self::from_rgb(image.to_rgb8())
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(image::open(path.as_ref())?))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::new(image::load_from_memory(data)?))
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn is_almost_white(&self, pixel: &Rgb<u8>) -> bool {
        pixel.0.iter().all(|&v| 255 - v <= self.tolerance)
    }

    pub fn is_almost_black(&self, pixel: &Rgb<u8>) -> bool {
        pixel.0.iter().all(|&v| v <= self.tolerance)
    }

    fn is_backdrop(&self, pixel: &Rgb<u8>, backdrop: Backdrop) -> bool {
        match backdrop {
            Backdrop::White => self.is_almost_white(pixel),
            Backdrop::Black => self.is_almost_black(pixel),
        }
    }

    fn column_has_content(&self, x: u32, backdrop: Backdrop) -> bool {
        (0..self.height()).any(|y| !self.is_backdrop(self.image.get_pixel(x, y), backdrop))
    }

    fn row_has_content(&self, y: u32, backdrop: Backdrop) -> bool {
        (0..self.width()).any(|x| !self.is_backdrop(self.image.get_pixel(x, y), backdrop))
    }

    pub fn find_leftmost(&self, backdrop: Backdrop) -> Option<u32> {
        (0..self.width()).find(|&x| self.column_has_content(x, backdrop))
    }

    pub fn find_uppermost(&self, backdrop: Backdrop) -> Option<u32> {
        (0..self.height()).find(|&y| self.row_has_content(y, backdrop))
    }

    pub fn find_rightmost(&self, backdrop: Backdrop) -> Option<u32> {
        (0..self.width())
            .rev()
            .find(|&x| self.column_has_content(x, backdrop))
    }

    pub fn find_downmost(&self, backdrop: Backdrop) -> Option<u32> {
        (0..self.height())
            .rev()
            .find(|&y| self.row_has_content(y, backdrop))
    }

    /// Single pass over every pixel; equivalent to the four edge scans.
    pub fn content_bounds(&self, backdrop: Backdrop) -> Option<ContentBounds> {
        let mut bounds: Option<ContentBounds> = None;
        for (x, y, pixel) in self.image.enumerate_pixels() {
            if self.is_backdrop(pixel, backdrop) {
                continue;
            }
            bounds = Some(match bounds {
                None => ContentBounds {
                    left: x,
                    top: y,
                    right: x,
                    bottom: y,
                },
                Some(b) => ContentBounds {
                    left: b.left.min(x),
                    top: b.top.min(y),
                    right: b.right.max(x),
                    bottom: b.bottom.max(y),
                },
            });
        }
        bounds
    }

    /// Crop with exclusive `right` / `lower` edges.
    pub fn crop(&self, left: u32, upper: u32, right: u32, lower: u32) -> Result<RgbImage> {
        if right > self.width() || lower > self.height() {
            return Err(JunctionError::CropOutOfBounds {
                left,
                upper,
                right,
                lower,
                width: self.width(),
                height: self.height(),
            });
        }
        if left >= right || upper >= lower {
            return Err(JunctionError::InvalidCrop);
        }
        Ok(imageops::crop_imm(&self.image, left, upper, right - left, lower - upper).to_image())
    }

    pub fn crop_to_content(&self, backdrop: Backdrop) -> Result<RgbImage> {
        let bounds = self
            .content_bounds(backdrop)
            .ok_or(JunctionError::BlankImage {
                backdrop: backdrop.label(),
            })?;
        debug!(
            "Content bounds {:?} in {}x{} image",
            bounds,
            self.width(),
            self.height()
        );
        self.crop(bounds.left, bounds.top, bounds.right + 1, bounds.bottom + 1)
    }

    /// Width wins when both dimensions are given. The derived side is
    /// truncated, never below one pixel.
    pub fn resize_with_aspect_ratio(
        &self,
        new_width: Option<u32>,
        new_height: Option<u32>,
    ) -> Result<ImageAnalyzer> {
        let (target_w, target_h) = scaled_dimensions(self.image.dimensions(), new_width, new_height)?;
        let resized = imageops::resize(&self.image, target_w, target_h, RESIZE_FILTER);
        Ok(ImageAnalyzer {
            image: resized,
            tolerance: self.tolerance,
        })
    }

    /// Alpha-aware paste. The overlay must fit entirely inside the image.
    pub fn paste(&mut self, overlay: &RgbaImage, position: (i64, i64)) -> Result<()> {
        check_overlay_fits(self.image.dimensions(), overlay.dimensions(), position)?;
        let mut canvas = DynamicImage::ImageRgb8(self.image.clone()).to_rgba8();
        imageops::overlay(&mut canvas, overlay, position.0, position.1);
        self.image = DynamicImage::ImageRgba8(canvas).to_rgb8();
        Ok(())
    }
}

/// Size of `(width, height)` scaled to the requested width or height, with
/// the other side following the aspect ratio. Saturates at `u32::MAX`.
pub fn scaled_dimensions(
    (width, height): (u32, u32),
    new_width: Option<u32>,
    new_height: Option<u32>,
) -> Result<(u32, u32)> {
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    let (target_w, target_h) = match (new_width, new_height) {
        (Some(nw), _) => (nw, (nw as f64 * h / w) as u32),
        (None, Some(nh)) => ((nh as f64 * w / h) as u32, nh),
        (None, None) => return Err(JunctionError::MissingDimension),
    };
    Ok((target_w.max(1), target_h.max(1)))
}

/// Fails with `OverlayOutOfBounds` unless an overlay of `overlay` size at
/// `(x, y)` lies entirely inside `base`. Returns the unsigned origin.
pub fn check_overlay_fits(
    base: (u32, u32),
    overlay: (u32, u32),
    (x, y): (i64, i64),
) -> Result<(u32, u32)> {
    let fits_axis = |pos: i64, len: u32, limit: u32| -> Option<u32> {
        let start = u32::try_from(pos).ok()?;
        let end = start.checked_add(len)?;
        (end <= limit).then_some(start)
    };
    match (
        fits_axis(x, overlay.0, base.0),
        fits_axis(y, overlay.1, base.1),
    ) {
        (Some(ox), Some(oy)) => Ok((ox, oy)),
        _ => Err(JunctionError::OverlayOutOfBounds {
            x,
            y,
            overlay_width: overlay.0,
            overlay_height: overlay.1,
            base_width: base.0,
            base_height: base.1,
        }),
    }
}

pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Concatenate images side by side or stacked, padding with white.
pub fn layout_images(images: &[RgbImage], layout: Layout) -> Result<RgbImage> {
    if images.is_empty() {
        return Err(JunctionError::EmptyLayout);
    }
    let white = Rgb([255, 255, 255]);
    let mut canvas = match layout {
        Layout::Horizontal => RgbImage::from_pixel(
            images.iter().map(|i| i.width()).sum(),
            images.iter().map(|i| i.height()).max().unwrap_or(0),
            white,
        ),
        Layout::Vertical => RgbImage::from_pixel(
            images.iter().map(|i| i.width()).max().unwrap_or(0),
            images.iter().map(|i| i.height()).sum(),
            white,
        ),
    };

    let mut offset: i64 = 0;
    for img in images {
        match layout {
            Layout::Horizontal => {
                imageops::replace(&mut canvas, img, offset, 0);
                offset += img.width() as i64;
            }
            Layout::Vertical => {
                imageops::replace(&mut canvas, img, 0, offset);
                offset += img.height() as i64;
            }
        }
    }
    Ok(canvas)
}

/// Linear blend `a * (1 - alpha) + b * alpha`; `b` is resized to `a` first.
pub fn merge_images(a: &DynamicImage, b: &DynamicImage, alpha: f32) -> RgbaImage {
    let first = a.to_rgba8();
    let second = if a.width() != b.width() || a.height() != b.height() {
        b.resize_exact(a.width(), a.height(), RESIZE_FILTER).to_rgba8()
    } else {
        b.to_rgba8()
    };

    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = RgbaImage::new(first.width(), first.height());
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = first.get_pixel(x, y);
        let q = second.get_pixel(x, y);
        for c in 0..4 {
            let v = p[c] as f32 * (1.0 - alpha) + q[c] as f32 * alpha;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
