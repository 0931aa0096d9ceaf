use regex::Regex;

use sectionist_core::DEFAULT_HORIZONTAL_TOLERANCE;
use sectionist_core::config_file::SegmenterConfig;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the section segmentation pipeline.
///
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── geometry.rs ──
    /// Vertical delta below which a stroke is a horizontal rule.
    pub(crate) horizontal_tolerance: f32,

    // ── segmenter.rs ──
    /// Emit the final unterminated section instead of dropping it.
    pub(crate) flush_trailing_section: bool,

    // ── normalize.rs ──
    /// Rendering artifacts stripped before whitespace is collapsed.
    pub(crate) artifact_patterns: ListOverride<Regex>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            horizontal_tolerance: DEFAULT_HORIZONTAL_TOLERANCE,
            flush_trailing_section: false,
            artifact_patterns: ListOverride::Default,
        }
    }
}

impl ParsingConfig {
    pub fn horizontal_tolerance(&self) -> f32 {
        self.horizontal_tolerance
    }

    pub fn flush_trailing_section(&self) -> bool {
        self.flush_trailing_section
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    horizontal_tolerance: Option<f32>,
    flush_trailing_section: Option<bool>,
    artifact_patterns: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[segmenter]` table of a config file.
    pub fn from_file_config(config: &SegmenterConfig) -> Self {
        let mut builder = Self {
            horizontal_tolerance: config.horizontal_tolerance,
            flush_trailing_section: config.flush_trailing_section,
            artifact_patterns: ListOverride::Default,
        };
        if let Some(patterns) = &config.artifact_patterns {
            builder = builder.set_artifact_patterns(patterns.clone());
        }
        for pattern in config.extra_artifact_patterns.iter().flatten() {
            builder = builder.add_artifact_pattern(pattern.clone());
        }
        builder
    }

    pub fn horizontal_tolerance(mut self, tolerance: f32) -> Self {
        self.horizontal_tolerance = Some(tolerance);
        self
    }

    pub fn flush_trailing_section(mut self, flush: bool) -> Self {
        self.flush_trailing_section = Some(flush);
        self
    }

    // ── Artifact patterns ──

    pub fn set_artifact_patterns(mut self, patterns: Vec<String>) -> Self {
        self.artifact_patterns = ListOverride::Replace(patterns);
        self
    }

    /// Add a pattern. After [`set_artifact_patterns`](Self::set_artifact_patterns)
    /// this appends to the replacement list; otherwise it extends the defaults.
    pub fn add_artifact_pattern(mut self, pattern: String) -> Self {
        match &mut self.artifact_patterns {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(pattern),
            ListOverride::Default => self.artifact_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile_all = |patterns: Vec<String>| -> Result<Vec<Regex>, regex::Error> {
            patterns.iter().map(|p| Regex::new(p)).collect()
        };

        let artifact_patterns = match self.artifact_patterns {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(p) => ListOverride::Replace(compile_all(p)?),
            ListOverride::Extend(p) => ListOverride::Extend(compile_all(p)?),
        };

        Ok(ParsingConfig {
            horizontal_tolerance: self
                .horizontal_tolerance
                .unwrap_or(DEFAULT_HORIZONTAL_TOLERANCE),
            flush_trailing_section: self.flush_trailing_section.unwrap_or(false),
            artifact_patterns,
        })
    }
}
