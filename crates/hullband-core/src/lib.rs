//! Convex hulls of the connected components of a binary mask.
//!
//! Hullband takes a row-major binary mask and produces, for every 8-connected
//! foreground component, the ordered vertex list of its convex hull, packed
//! into two image-sized index arrays.
//!
//! # Architecture Overview
//!
//! 1. **Grid construction**: the borrowed mask is expanded into a [`image::PixelGrid`]
//!    of `(row, col, label)` cells, one row per rayon task.
//!
//! 2. **Band labeling**:
//!    - The rows are split into disjoint bands, each with a reserved label range.
//!    - Every band is flood-filled in parallel and never looks past its own rows.
//!
//! 3. **Band merge**:
//!    - A union-find over the labels on both sides of each band border joins
//!      components that the split cut apart.
//!
//! 4. **Hull building**:
//!    - Quickhull with an explicit segment stack and exact integer orientation
//!      tests, one rayon task per component.
//!
//! 5. **Packing**:
//!    - Hull id and vertex position per pixel, see [`codec`].
//!
//! # Example
//!
//! ```
//! use hullband_core::{HullPipeline, config::PipelineConfig, image::MaskView};
//!
//! let mask = [
//!     1, 0, 0, 0, //
//!     1, 0, 0, 0, //
//!     1, 0, 0, 0, //
//!     1, 1, 1, 0, //
//! ];
//! let view = MaskView::new(&mask, 4, 4).unwrap();
//! let pipeline = HullPipeline::with_config(PipelineConfig::builder().num_bands(2).build());
//!
//! let mut hulls_indxs = vec![0u32; 16];
//! let mut pixels_indxs = vec![0u32; 16];
//! let stats = pipeline.run(&view, &mut hulls_indxs, &mut pixels_indxs);
//!
//! assert_eq!(stats.num_components, 1);
//! assert_eq!(stats.num_hull_vertices, 3);
//! ```

/// Dense hull packing and unpacking.
pub mod codec;
/// Pipeline configuration.
pub mod config;
/// Quickhull per component.
pub mod hull;
/// Mask views and the labeled pixel grid.
pub mod image;
/// Band-parallel connected components labeling using Union-Find.
pub mod segmentation;
/// Utilities for testing and synthetic data generation.
pub mod test_utils;

pub use crate::config::PipelineConfig;
pub use crate::hull::Hull;
pub use crate::image::{MaskView, Pixel};
pub use crate::segmentation::Component;

use crate::image::PixelGrid;

/// Pipeline-wide statistics for a single run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineStats {
    /// Time taken to build the pixel grid in milliseconds.
    pub grid_ms: f64,
    /// Time taken for parallel band labeling in milliseconds.
    pub labeling_ms: f64,
    /// Time taken for the band border merge in milliseconds.
    pub merge_ms: f64,
    /// Time taken for hull building in milliseconds.
    pub hull_ms: f64,
    /// Time taken to pack the hulls in milliseconds.
    pub pack_ms: f64,
    /// Total pipeline time in milliseconds.
    pub total_ms: f64,
    /// Number of bands used for labeling.
    pub num_bands: usize,
    /// Components found by the bands before merging.
    pub num_raw_components: usize,
    /// Components after merging.
    pub num_components: usize,
    /// Total number of hull vertices over all hulls.
    pub num_hull_vertices: usize,
}

/// Full result of a run including intermediate data for debugging.
pub struct FullPipelineResult {
    /// Merged components.
    pub components: Vec<Component>,
    /// One hull per component, in the same order.
    pub hulls: Vec<Hull>,
    /// Final grid labels (row-major), band-local ids before merging.
    pub labels: Vec<u32>,
    /// Pipeline statistics.
    pub stats: PipelineStats,
}

/// Everything the stages produce before packing.
struct StageOutput {
    grid: PixelGrid,
    components: Vec<Component>,
    hulls: Vec<Hull>,
    stats: PipelineStats,
}

/// Reusable entry point for the hull pipeline.
#[derive(Clone, Debug, Default)]
pub struct HullPipeline {
    config: PipelineConfig,
}

impl HullPipeline {
    /// Create a new pipeline with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline and pack the hulls into the two output buffers.
    ///
    /// # Panics
    /// Panics if an output buffer is not `height * width` long.
    pub fn run(
        &self,
        mask: &MaskView,
        hulls_indxs: &mut [u32],
        pixels_indxs: &mut [u32],
    ) -> PipelineStats {
        let stages = self.run_stages(mask);
        let mut stats = stages.stats;

        let start_pack = std::time::Instant::now();
        {
            let _span = tracing::info_span!("hull_packing").entered();
            codec::pack_hulls(&stages.hulls, mask.width, mask.height, hulls_indxs, pixels_indxs);
        }
        stats.pack_ms = start_pack.elapsed().as_secs_f64() * 1000.0;
        stats.total_ms += stats.pack_ms;
        stats
    }

    /// Run labeling and hull building, returning all intermediate data.
    pub fn run_full(&self, mask: &MaskView) -> FullPipelineResult {
        let stages = self.run_stages(mask);
        FullPipelineResult {
            labels: stages.grid.pixels().iter().map(|p| p.label).collect(),
            components: stages.components,
            hulls: stages.hulls,
            stats: stages.stats,
        }
    }

    fn run_stages(&self, mask: &MaskView) -> StageOutput {
        let mut stats = PipelineStats::default();
        let start_total = std::time::Instant::now();

        // 1. Grid
        let start_grid = std::time::Instant::now();
        let mut grid = {
            let _span = tracing::info_span!("pixel_grid").entered();
            PixelGrid::from_mask(mask)
        };
        stats.grid_ms = start_grid.elapsed().as_secs_f64() * 1000.0;

        // 2. Band labeling
        let num_bands = self.config.effective_bands(grid.height);
        let ranges = segmentation::plan_bands(grid.height, grid.width, num_bands);
        stats.num_bands = ranges.len();

        let start_label = std::time::Instant::now();
        let raw = {
            let _span = tracing::info_span!("band_labeling", bands = ranges.len()).entered();
            segmentation::label_bands(&mut grid, &ranges)
        };
        stats.labeling_ms = start_label.elapsed().as_secs_f64() * 1000.0;
        stats.num_raw_components = raw.len();

        // 3. Merge across band borders
        let start_merge = std::time::Instant::now();
        let components = {
            let _span = tracing::info_span!("band_merge").entered();
            segmentation::merge_bands(&grid, &ranges, raw)
        };
        stats.merge_ms = start_merge.elapsed().as_secs_f64() * 1000.0;
        stats.num_components = components.len();
        tracing::debug!(
            bands = stats.num_bands,
            raw = stats.num_raw_components,
            merged = stats.num_components,
            "labeled components"
        );

        // 4. Hulls
        let start_hull = std::time::Instant::now();
        let hulls = {
            let _span = tracing::info_span!("hull_building").entered();
            hull::build_hulls(&components, self.config.parallel_hulls)
        };
        stats.hull_ms = start_hull.elapsed().as_secs_f64() * 1000.0;
        stats.num_hull_vertices = hulls.iter().map(Hull::len).sum();

        stats.total_ms = start_total.elapsed().as_secs_f64() * 1000.0;

        StageOutput {
            grid,
            components,
            hulls,
            stats,
        }
    }
}

/// One-shot convenience wrapper with the default configuration.
///
/// Returns the number of hulls written.
///
/// # Errors
/// Returns an error if `mask` is not `height * width` long.
///
/// # Panics
/// Panics if an output buffer is not `height * width` long.
pub fn convex_hull_components(
    mask: &[u8],
    height: usize,
    width: usize,
    hulls_indxs: &mut [u32],
    pixels_indxs: &mut [u32],
) -> Result<usize, String> {
    let view = MaskView::new(mask, height, width)?;
    let stats = HullPipeline::new().run(&view, hulls_indxs, pixels_indxs);
    Ok(stats.num_components)
}
