use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layout configuration for one assembly run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct LayoutSettings {
    /// Size each page to its (rotated) image instead of a standard page
    pub preserve_size: bool,

    /// Re-encode quality in [0.1, 1.0]
    pub quality: f32,

    /// Pixels per inch used to convert image size to physical size
    pub dpi: u32,

    // Standard page options, ignored when `preserve_size` is set
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Scale to fit inside the margins (aspect preserved) instead of
    /// stretching to the margin box
    pub fit_to_page: bool,

    /// Output file stem
    pub filename_base: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            preserve_size: true,
            quality: DEFAULT_QUALITY,
            dpi: DEFAULT_DPI,
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            fit_to_page: false,
            filename_base: DEFAULT_FILENAME_BASE.to_string(),
        }
    }
}

impl LayoutSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize settings: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ComposeError::Config(format!(
                "Quality must be between {} and {}, got {}",
                MIN_QUALITY, MAX_QUALITY, self.quality
            )));
        }

        if self.dpi == 0 {
            return Err(ComposeError::Config("DPI must be positive".to_string()));
        }

        if self.filename_base.trim().is_empty() {
            return Err(ComposeError::Config(
                "Output filename must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Name of the produced file
    pub fn output_filename(&self) -> String {
        format!("{}.{}", self.filename_base, PDF_EXTENSION)
    }
}

/// What an assembly run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutputMode {
    /// A named file ready to be written
    #[default]
    Persist,
    /// A revocable in-memory buffer for a preview surface
    Preview,
}
