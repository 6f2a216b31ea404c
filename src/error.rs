use thiserror::Error;

#[derive(Error, Debug)]
pub enum JunctionError {
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to retrieve {url}: HTTP {status}: {body}")]
    FetchFailed {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Asset {location} exceeds the {limit} byte limit")]
    AssetTooLarge { location: String, limit: usize },

    #[error("No non-{backdrop} content found in image")]
    BlankImage { backdrop: &'static str },

    #[error("Crop coordinates are out of image bounds: ({left}, {upper}, {right}, {lower}) on {width}x{height}")]
    CropOutOfBounds {
        left: u32,
        upper: u32,
        right: u32,
        lower: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid crop dimensions: ensure left < right and upper < lower")]
    InvalidCrop,

    #[error("At least one of new_width or new_height must be specified")]
    MissingDimension,

    #[error("Overlay image ({overlay_width}x{overlay_height} at {x},{y}) goes beyond the base image ({base_width}x{base_height})")]
    OverlayOutOfBounds {
        x: i64,
        y: i64,
        overlay_width: u32,
        overlay_height: u32,
        base_width: u32,
        base_height: u32,
    },

    #[error("Invalid alignment '{0}'")]
    InvalidAlignment(String),

    #[error("Invalid layout '{0}': choose 'horizontal' or 'vertical'")]
    InvalidLayout(String),

    #[error("No images to lay out")]
    EmptyLayout,

    #[error("Product type '{0}' not found in buffer table")]
    UnknownProduct(String),

    #[error("Invalid placement for '{product}': target height must be positive")]
    InvalidPlacement { product: String },

    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error("Nothing to archive: no completed images")]
    EmptyArchive,
}

pub type Result<T> = std::result::Result<T, JunctionError>;
