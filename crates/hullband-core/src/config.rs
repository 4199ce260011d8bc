//! Configuration for the hull pipeline.
//!
//! [`PipelineConfig`] is fixed when a [`crate::HullPipeline`] is constructed.
//! None of its settings change the result; they only decide how the work is split.

/// Pipeline-level configuration.
///
/// # Example
/// ```
/// use hullband_core::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .num_bands(4)
///     .min_band_rows(8)
///     .build();
/// assert_eq!(config.num_bands, 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Number of row bands labeled in parallel (default: 0).
    /// 0 means one band per rayon worker thread.
    pub num_bands: usize,
    /// Minimum number of rows per band (default: 1).
    /// Short images get fewer bands instead of many one-row slivers.
    pub min_band_rows: usize,
    /// Build hulls on the rayon pool (default: true).
    pub parallel_hulls: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_bands: 0,
            min_band_rows: 1,
            parallel_hulls: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Number of bands actually used for an image of `height` rows.
    ///
    /// Always in `1..=max(height, 1)`.
    #[must_use]
    pub fn effective_bands(&self, height: usize) -> usize {
        let requested = if self.num_bands == 0 {
            rayon::current_num_threads()
        } else {
            self.num_bands
        };
        let by_rows = height / self.min_band_rows.max(1);
        requested.min(by_rows).max(1)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Default)]
pub struct PipelineConfigBuilder {
    num_bands: Option<usize>,
    min_band_rows: Option<usize>,
    parallel_hulls: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the number of labeling bands (0 = one per worker thread).
    #[must_use]
    pub fn num_bands(mut self, bands: usize) -> Self {
        self.num_bands = Some(bands);
        self
    }

    /// Set the minimum number of rows per band.
    #[must_use]
    pub fn min_band_rows(mut self, rows: usize) -> Self {
        self.min_band_rows = Some(rows);
        self
    }

    /// Enable or disable parallel hull building.
    #[must_use]
    pub fn parallel_hulls(mut self, enable: bool) -> Self {
        self.parallel_hulls = Some(enable);
        self
    }

    /// Build the configuration, using defaults for unset fields.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        let d = PipelineConfig::default();
        PipelineConfig {
            num_bands: self.num_bands.unwrap_or(d.num_bands),
            min_band_rows: self.min_band_rows.unwrap_or(d.min_band_rows).max(1),
            parallel_hulls: self.parallel_hulls.unwrap_or(d.parallel_hulls),
        }
    }
}
