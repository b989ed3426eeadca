//! Print configuration.
//!
//! All values are plain data handed to the composers; nothing here is global.
//! A configuration can be read from JSON, missing keys falling back to the
//! defaults below.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Points per centimetre.
pub const CM: f32 = 72.0 / 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A4 => (21.0 * CM, 29.7 * CM),
            Self::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("a4") {
            Ok(Self::A4)
        } else if normalized.eq_ignore_ascii_case("letter") {
            Ok(Self::Letter)
        } else {
            Err(Error::Config(format!(
                "Invalid page size '{normalized}'. Supported values: 'a4' or 'letter'."
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    pub font_name: String,
    pub font_size: f32,
    pub space_before: f32,
    pub space_after: f32,
    /// Line spacing; `None` uses the font size.
    pub leading: Option<f32>,
    /// In centimetres, applied to all four sides.
    pub page_margin: f32,
    /// In centimetres.
    pub column_gap: f32,
    pub page_size: PageSize,
    pub light_tile_color: String,
    pub dark_tile_color: String,
    /// `{piece}` is replaced by side and role, e.g. `wk` or `bp`.
    pub piece_images: String,
    pub diagram_marker: String,
    /// Share of a tile left around a piece glyph.
    pub tile_padding: f32,
    /// Board width relative to the column width.
    pub board_fraction: f32,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            space_before: 6.0,
            space_after: 6.0,
            leading: None,
            page_margin: 1.27,
            column_gap: 1.0,
            page_size: PageSize::A4,
            light_tile_color: "#DCD7BC".to_string(),
            dark_tile_color: "#7C7671".to_string(),
            piece_images: "piece_images/merida/72/{piece}.png".to_string(),
            diagram_marker: "<*>".to_string(),
            tile_padding: 0.1,
            board_fraction: 0.8,
        }
    }
}

impl PrintConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn leading(&self) -> f32 {
        self.leading.unwrap_or(self.font_size)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("font_size", self.font_size),
            ("leading", self.leading()),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("space_before", self.space_before),
            ("space_after", self.space_after),
            ("page_margin", self.page_margin),
            ("column_gap", self.column_gap),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(self.board_fraction > 0.0 && self.board_fraction <= 1.0) {
            return Err(Error::Config(format!(
                "board_fraction must be in (0, 1], got {}",
                self.board_fraction
            )));
        }
        if !(0.0..1.0).contains(&self.tile_padding) {
            return Err(Error::Config(format!(
                "tile_padding must be in [0, 1), got {}",
                self.tile_padding
            )));
        }
        if self.diagram_marker.is_empty() {
            return Err(Error::Config("diagram_marker must not be empty".to_string()));
        }
        if !self.piece_images.contains("{piece}") {
            return Err(Error::Config(format!(
                "piece_images '{}' has no {{piece}} placeholder",
                self.piece_images
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PrintConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.leading(), 12.0);
        assert_eq!(config.diagram_marker, "<*>");
    }

    #[test]
    fn test_from_json_fills_missing_keys_with_defaults() {
        let config =
            PrintConfig::from_json(r#"{"font_size": 10, "page_size": "letter"}"#).unwrap();
        assert_eq!(config.font_size, 10.0);
        assert_eq!(config.leading(), 10.0);
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.font_name, "Helvetica");
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = PrintConfig::from_json(r#"{"font": "Courier"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PrintConfig {
            board_fraction: 1.5,
            ..PrintConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PrintConfig {
            font_size: 0.0,
            ..PrintConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PrintConfig {
            piece_images: "pieces/".to_string(),
            ..PrintConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_page_size_parse_case_insensitive() {
        assert_eq!(" A4 ".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!("LETTER".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("legal".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_page_size_dimensions() {
        let (width, height) = PageSize::A4.dimensions();
        assert!((width - 595.28).abs() < 0.01);
        assert!((height - 841.89).abs() < 0.01);
        assert_eq!(PageSize::Letter.dimensions(), (612.0, 792.0));
    }
}
