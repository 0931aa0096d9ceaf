use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub segmenter: Option<SegmenterConfig>,
    pub summary: Option<SummaryFileConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Vertical delta below which a stroke counts as a horizontal rule.
    pub horizontal_tolerance: Option<f32>,
    /// Emit the final unterminated section instead of dropping it.
    pub flush_trailing_section: Option<bool>,
    /// Replace the built-in artifact patterns.
    pub artifact_patterns: Option<Vec<String>>,
    /// Patterns stripped in addition to the built-in ones.
    pub extra_artifact_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFileConfig {
    pub max_concurrent: Option<usize>,
    pub excluded_sections: Option<Vec<String>>,
}

/// Platform config directory path: `<config_dir>/sectionist/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sectionist").join("config.toml"))
}

/// Load config by cascading CWD `.sectionist.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".sectionist.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_seg = base.segmenter.unwrap_or_default();
    let over_seg = overlay.segmenter.unwrap_or_default();
    let base_sum = base.summary.unwrap_or_default();
    let over_sum = overlay.summary.unwrap_or_default();

    ConfigFile {
        segmenter: Some(SegmenterConfig {
            horizontal_tolerance: over_seg
                .horizontal_tolerance
                .or(base_seg.horizontal_tolerance),
            flush_trailing_section: over_seg
                .flush_trailing_section
                .or(base_seg.flush_trailing_section),
            artifact_patterns: over_seg.artifact_patterns.or(base_seg.artifact_patterns),
            extra_artifact_patterns: over_seg
                .extra_artifact_patterns
                .or(base_seg.extra_artifact_patterns),
        }),
        summary: Some(SummaryFileConfig {
            max_concurrent: over_sum.max_concurrent.or(base_sum.max_concurrent),
            excluded_sections: over_sum.excluded_sections.or(base_sum.excluded_sections),
        }),
    }
}
