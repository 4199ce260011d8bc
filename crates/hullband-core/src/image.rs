//! Zero-copy mask ingestion and the labeled pixel grid.

use rayon::prelude::*;

/// Label of a background cell. Never assigned to a component.
pub const BACKGROUND: u32 = 0;
/// Label of a foreground cell that no band has visited yet.
pub const UNVISITED: u32 = 1;
/// Smallest label that identifies a component (or a hull position after unpacking).
pub const FIRST_COMPONENT_LABEL: u32 = 2;

/// A borrowed view over a row-major binary mask.
///
/// Any nonzero byte is foreground.
#[derive(Clone, Copy, Debug)]
pub struct MaskView<'a> {
    /// Row-major mask bytes, exactly `height * width` long.
    pub data: &'a [u8],
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl<'a> MaskView<'a> {
    /// Create a new MaskView after validating that the buffer size matches the dimensions.
    pub fn new(data: &'a [u8], height: usize, width: usize) -> Result<Self, String> {
        let required_size = height.checked_mul(width).ok_or_else(|| {
            format!("Mask dimensions {}x{} overflow the address space", height, width)
        })?;
        if data.len() != required_size {
            return Err(format!(
                "Mask buffer size ({}) does not match {}x{} image (required: {})",
                data.len(),
                height,
                width,
                required_size
            ));
        }
        Ok(Self { data, height, width })
    }

    /// Number of cells in the mask.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the mask has no cells at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A grid cell: its coordinate plus a mutable label.
///
/// Coordinates and labels are compared through [`Pixel::same_coords`] and
/// [`Pixel::has_label`]; there is intentionally no `PartialEq`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pixel {
    /// Row index (y).
    pub row: u32,
    /// Column index (x).
    pub col: u32,
    /// 0 = background, 1 = unvisited foreground, >= 2 = component or position id.
    pub label: u32,
}

impl Pixel {
    /// Create a pixel at (row, col) with the given label.
    #[inline]
    #[must_use]
    pub const fn new(row: u32, col: u32, label: u32) -> Self {
        Self { row, col, label }
    }

    /// True if both pixels sit at the same (row, col).
    #[inline]
    #[must_use]
    pub fn same_coords(&self, other: &Pixel) -> bool {
        self.row == other.row && self.col == other.col
    }

    /// True if this pixel carries exactly `label`.
    #[inline]
    #[must_use]
    pub fn has_label(&self, label: u32) -> bool {
        self.label == label
    }

    /// True if the pixel has been assigned to a component.
    #[inline]
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.label >= FIRST_COMPONENT_LABEL
    }

    /// `(row, col)` pair, handy for set comparisons.
    #[inline]
    #[must_use]
    pub fn coords(&self) -> (u32, u32) {
        (self.row, self.col)
    }

    /// Row-major index of this pixel in a grid of the given width.
    #[inline]
    #[must_use]
    pub fn index(&self, width: usize) -> usize {
        self.row as usize * width + self.col as usize
    }
}

/// Flat row-major store of labeled cells built from a [`MaskView`].
#[derive(Clone, Debug)]
pub struct PixelGrid {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Build the grid, one row per rayon task. Foreground cells start as [`UNVISITED`].
    #[must_use]
    pub fn from_mask(mask: &MaskView) -> Self {
        let (height, width) = (mask.height, mask.width);
        let mut pixels = vec![Pixel::default(); mask.len()];
        if !mask.is_empty() {
            pixels
                .par_chunks_mut(width)
                .zip(mask.data.par_chunks(width))
                .enumerate()
                .for_each(|(row, (dst, src))| {
                    for (col, (px, &flag)) in dst.iter_mut().zip(src).enumerate() {
                        let label = if flag != 0 { UNVISITED } else { BACKGROUND };
                        *px = Pixel::new(row as u32, col as u32, label);
                    }
                });
        }
        Self {
            height,
            width,
            pixels,
        }
    }

    /// Read-only access to all cells.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Pixel at (row, col).
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> &Pixel {
        assert!(row < self.height && col < self.width, "({}, {}) out of bounds", row, col);
        &self.pixels[row * self.width + col]
    }

    /// Split the grid into disjoint mutable row bands.
    ///
    /// `ranges` must be contiguous, ascending and cover `0..height`; each band
    /// gets exclusive ownership of its rows.
    ///
    /// # Panics
    /// Panics if a range does not start where the previous one ended.
    pub fn split_bands_mut(&mut self, ranges: &[BandRange]) -> Vec<Band<'_>> {
        let width = self.width;
        let mut bands = Vec::with_capacity(ranges.len());
        let mut rest: &mut [Pixel] = &mut self.pixels;
        let mut expected_start = 0;
        for range in ranges {
            assert_eq!(range.start_row, expected_start, "band ranges must be contiguous");
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.rows() * width);
            bands.push(Band {
                range: *range,
                width,
                pixels: head,
            });
            rest = tail;
            expected_start = range.end_row;
        }
        bands
    }
}

/// Half-open row range `[start_row, end_row)` with its reserved label offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandRange {
    /// First row of the band.
    pub start_row: usize,
    /// One past the last row of the band.
    pub end_row: usize,
    /// First label this band may hand out.
    pub label_offset: u32,
}

impl BandRange {
    /// Number of rows in the band.
    #[inline]
    pub fn rows(&self) -> usize {
        self.end_row - self.start_row
    }

    /// True if the band owns no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }
}

/// Exclusive mutable view over the rows of one band.
pub struct Band<'a> {
    /// Rows owned by this band and its label offset.
    pub range: BandRange,
    /// Grid width.
    pub width: usize,
    pixels: &'a mut [Pixel],
}

impl Band<'_> {
    /// Mutable pixel at an absolute (row, col). `row` must lie inside the band.
    #[inline(always)]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut Pixel {
        debug_assert!(row >= self.range.start_row && row < self.range.end_row);
        let local = (row - self.range.start_row) * self.width + col;
        &mut self.pixels[local]
    }

    /// Label at an absolute (row, col). `row` must lie inside the band.
    #[inline(always)]
    pub fn label_at(&self, row: usize, col: usize) -> u32 {
        debug_assert!(row >= self.range.start_row && row < self.range.end_row);
        self.pixels[(row - self.range.start_row) * self.width + col].label
    }
}
