use crate::error::{JunctionError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Up,
    #[default]
    Center,
    Down,
}

impl FromStr for HorizontalAlign {
    type Err = JunctionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(JunctionError::InvalidAlignment(other.to_string())),
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = JunctionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Self::Up),
            "center" => Ok(Self::Center),
            "down" => Ok(Self::Down),
            other => Err(JunctionError::InvalidAlignment(other.to_string())),
        }
    }
}

impl HorizontalAlign {
    pub fn offset(self, overlay_width: u32, canvas_width: u32) -> i64 {
        let diff = canvas_width as i64 - overlay_width as i64;
        match self {
            Self::Left => 0,
            Self::Center => diff.div_euclid(2),
            Self::Right => diff,
        }
    }
}

impl VerticalAlign {
    pub fn offset(self, overlay_height: u32, canvas_height: u32) -> i64 {
        let diff = canvas_height as i64 - overlay_height as i64;
        match self {
            Self::Up => 0,
            Self::Center => diff.div_euclid(2),
            Self::Down => diff,
        }
    }
}

/// Top-left coordinate placing an overlay on a canvas. Negative when the
/// overlay is larger than the canvas on that axis.
pub fn alignment_offset(
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
    overlay_size: (u32, u32),
    canvas_size: (u32, u32),
) -> (i64, i64) {
    (
        horizontal.offset(overlay_size.0, canvas_size.0),
        vertical.offset(overlay_size.1, canvas_size.1),
    )
}
