use crate::alignment::HorizontalAlign;
use crate::error::{JunctionError, Result};
use serde::{Deserialize, Serialize};

const ASSET_BASE: &str = "https://raw.githubusercontent.com/Nanotez001/image_editor/refs/heads/main/asset";

/// A marketplace the composites are produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Short code shown in the selector, e.g. `LD`.
    pub code: String,
    pub name: String,
    /// URL or local path of the background template.
    pub template: String,
    /// URL or local path of the `product,buffer1,buffer2` table.
    pub buffer_table: String,
    /// Declared template size; the fetched template is checked against it.
    pub canvas: (u32, u32),
    /// Appended to each archived file name.
    pub archive_suffix: String,
    #[serde(default)]
    pub horizontal_align: HorizontalAlign,
}

impl PlatformSpec {
    pub fn archive_name(&self, original_name: &str) -> String {
        format!("{}_{}.jpg", original_name, self.archive_suffix)
    }
}

pub fn default_platforms() -> Vec<PlatformSpec> {
    vec![
        PlatformSpec {
            code: "LD".to_string(),
            name: "Lucky Digital".to_string(),
            template: format!("{}/temp/Temp_525x338.jpg", ASSET_BASE),
            buffer_table: format!("{}/buffer/LD_buffer.csv", ASSET_BASE),
            canvas: (525, 338),
            archive_suffix: "LuckyDigital".to_string(),
            horizontal_align: HorizontalAlign::Center,
        },
        PlatformSpec {
            code: "JJT".to_string(),
            name: "Jingjungto".to_string(),
            template: format!("{}/temp/Temp_1000x1000.jpg", ASSET_BASE),
            buffer_table: format!("{}/buffer/JJT_buffer.csv", ASSET_BASE),
            canvas: (1000, 1000),
            archive_suffix: "Jingjungto".to_string(),
            horizontal_align: HorizontalAlign::Center,
        },
    ]
}

/// Platform codes compare case-insensitively, so `ld` in a hand-edited
/// config still selects `LD`.
pub fn same_platform(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub fn find_platform<'a>(platforms: &'a [PlatformSpec], code: &str) -> Result<&'a PlatformSpec> {
    platforms
        .iter()
        .find(|p| same_platform(&p.code, code))
        .ok_or_else(|| JunctionError::UnknownPlatform(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platforms() {
        let platforms = default_platforms();
        let ld = find_platform(&platforms, "LD").unwrap();
        assert_eq!(ld.canvas, (525, 338));
        assert!(ld.template.ends_with("Temp_525x338.jpg"));

        let jjt = find_platform(&platforms, "jjt").unwrap();
        assert_eq!(jjt.archive_name("shoe.png"), "shoe.png_Jingjungto.jpg");

        assert!(matches!(
            find_platform(&platforms, "AW"),
            Err(JunctionError::UnknownPlatform(code)) if code == "AW"
        ));
    }

    #[test]
    fn test_lowercase_selection_matches_loaded_code() {
        let platforms = default_platforms();
        let loaded = &find_platform(&platforms, "ld").unwrap().code;
        assert_eq!(loaded, "LD");
        assert!(same_platform(loaded, "ld"));
        assert!(same_platform("JJT", " jjt "));
        assert!(!same_platform("LD", "JJT"));
    }

    #[test]
    fn test_alignment_defaults_when_missing_from_json() {
        let json = r#"{"code":"X","name":"X","template":"t.jpg","buffer_table":"b.csv",
                       "canvas":[10,10],"archive_suffix":"X"}"#;
        let spec: PlatformSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.horizontal_align, HorizontalAlign::Center);
    }
}
