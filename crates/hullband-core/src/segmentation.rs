//! Band-parallel 8-connected component labeling.
//!
//! The grid is cut into horizontal bands that are flood-filled independently,
//! each handing out labels from its own reserved range. Components that a band
//! border cut in two are stitched back together afterwards with a [`UnionFind`]
//! over the labels found on either side of each border.

use std::collections::HashMap;

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use rayon::prelude::*;

use crate::image::{Band, BandRange, FIRST_COMPONENT_LABEL, Pixel, PixelGrid, UNVISITED};

/// 8-neighborhood offsets as (d_row, d_col): row below, same row, row above.
const NEIGHBORS_8: [(isize, isize); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// A disjoint-set forest over sparse component labels.
///
/// Labels are registered lazily the first time they are looked up. Finds
/// compress paths iteratively and unions go by rank.
#[derive(Debug, Default)]
pub struct UnionFind {
    roots: HashMap<u32, u32>,
    ranks: HashMap<u32, u32>,
}

impl UnionFind {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of labels seen so far.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True if no label has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find the root of the set containing `label`, registering it as a
    /// singleton if it is new.
    pub fn find_root(&mut self, label: u32) -> u32 {
        if !self.roots.contains_key(&label) {
            self.roots.insert(label, label);
            self.ranks.insert(label, 1);
            return label;
        }

        let mut root = label;
        loop {
            let parent = self.roots[&root];
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut curr = label;
        while curr != root {
            let next = self.roots[&curr];
            self.roots.insert(curr, root);
            curr = next;
        }
        root
    }

    /// Unite the sets containing `x` and `y`.
    ///
    /// On equal ranks `y`'s root is attached under `x`'s root.
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find_root(x);
        let root_y = self.find_root(y);
        if root_x == root_y {
            return;
        }
        let rank_x = self.ranks[&root_x];
        let rank_y = self.ranks[&root_y];
        match rank_x.cmp(&rank_y) {
            std::cmp::Ordering::Greater => {
                self.roots.insert(root_y, root_x);
            }
            std::cmp::Ordering::Less => {
                self.roots.insert(root_x, root_y);
            }
            std::cmp::Ordering::Equal => {
                self.roots.insert(root_y, root_x);
                self.ranks.insert(root_x, rank_x + 1);
            }
        }
    }
}

/// A connected set of foreground pixels.
#[derive(Clone, Debug, Default)]
pub struct Component {
    /// Band-local id after labeling, union-find root after merging.
    pub label: u32,
    /// Member pixels in discovery order.
    pub pixels: Vec<Pixel>,
}

impl Component {
    /// Number of pixels in the component.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True if the component has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Split `height` rows into `num_bands` contiguous bands.
///
/// Every band gets `height / num_bands` rows and the remainder is spread one
/// row at a time over the leading bands. Band `i` may use labels starting at
/// `2 + i * stride`, where `stride` is the pixel count of the largest band, so
/// the ranges can never overlap.
///
/// # Panics
/// Panics if the label ranges would not fit in `u32`.
#[must_use]
pub fn plan_bands(height: usize, width: usize, num_bands: usize) -> Vec<BandRange> {
    let num_bands = num_bands.clamp(1, height.max(1));
    let base = height / num_bands;
    let remainder = height % num_bands;
    let max_rows = base + usize::from(remainder > 0);
    let stride = (max_rows * width).max(1) as u64;
    let last_offset = u64::from(FIRST_COMPONENT_LABEL) + (num_bands as u64) * stride;
    assert!(
        last_offset <= u64::from(u32::MAX),
        "{}x{} image has too many pixels for u32 labels",
        height,
        width
    );

    let mut ranges = Vec::with_capacity(num_bands);
    let mut start_row = 0;
    for i in 0..num_bands {
        let rows = base + usize::from(i < remainder);
        ranges.push(BandRange {
            start_row,
            end_row: start_row + rows,
            label_offset: (u64::from(FIRST_COMPONENT_LABEL) + i as u64 * stride) as u32,
        });
        start_row += rows;
    }
    ranges
}

/// Flood-fill every component inside one band.
///
/// Neighbors outside the band rows are never visited, so a region crossing the
/// band border comes out as several components here.
pub fn label_band(band: &mut Band, arena: &Bump) -> Vec<Component> {
    let BandRange {
        start_row,
        end_row,
        label_offset,
    } = band.range;
    let width = band.width;
    let mut components = Vec::new();
    let mut next_label = label_offset;
    let mut stack = BumpVec::new_in(arena);

    for row in start_row..end_row {
        for col in 0..width {
            if band.label_at(row, col) != UNVISITED {
                continue;
            }

            let mut pixels = Vec::new();
            let start = band.get_mut(row, col);
            start.label = next_label;
            pixels.push(*start);
            stack.push((row, col));

            while let Some((r, c)) = stack.pop() {
                for (dr, dc) in NEIGHBORS_8 {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < start_row as isize
                        || nr >= end_row as isize
                        || nc < 0
                        || nc >= width as isize
                    {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    let neighbor = band.get_mut(nr, nc);
                    if neighbor.has_label(UNVISITED) {
                        neighbor.label = next_label;
                        pixels.push(*neighbor);
                        stack.push((nr, nc));
                    }
                }
            }

            components.push(Component {
                label: next_label,
                pixels,
            });
            next_label += 1;
        }
    }

    components
}

/// Label all bands in parallel. Returns the raw, band-fragmented components.
///
/// The grid is only borrowed mutably for the duration of the call, so every
/// band has finished by the time the caller can read it again.
pub fn label_bands(grid: &mut PixelGrid, ranges: &[BandRange]) -> Vec<Component> {
    let bands = grid.split_bands_mut(ranges);
    let per_band: Vec<Vec<Component>> = bands
        .into_par_iter()
        .map(|mut band| {
            // Thread-local arena for the DFS stack
            let arena = Bump::new();
            label_band(&mut band, &arena)
        })
        .collect();
    per_band.into_iter().flatten().collect()
}

fn link_boundary_pixel(uf: &mut UnionFind, grid: &PixelGrid, row: usize, col: usize) {
    let upper = grid.get(row, col);
    if !upper.is_labeled() {
        return;
    }
    let lo = col.saturating_sub(1);
    let hi = (col + 1).min(grid.width - 1);
    for c in lo..=hi {
        let lower = grid.get(row + 1, c);
        if lower.is_labeled() {
            uf.union(upper.label, lower.label);
        }
    }
}

/// Stitch components cut by band borders back together.
///
/// Labels that touch across a border (8-connectivity) are united, then
/// components are grouped by the root of their first pixel's label. Groups
/// keep first-seen order, which callers should not rely on.
pub fn merge_bands(
    grid: &PixelGrid,
    ranges: &[BandRange],
    components: Vec<Component>,
) -> Vec<Component> {
    let mut uf = UnionFind::new();

    for range in ranges {
        if range.end_row == 0 || range.end_row >= grid.height {
            continue;
        }
        let row = range.end_row - 1;
        for col in 0..grid.width {
            link_boundary_pixel(&mut uf, grid, row, col);
        }
    }

    let mut root_to_index: HashMap<u32, usize> = HashMap::new();
    let mut merged: Vec<Component> = Vec::new();
    for component in components {
        let Some(first) = component.pixels.first() else {
            continue;
        };
        let root = uf.find_root(first.label);
        match root_to_index.get(&root) {
            Some(&idx) => merged[idx].pixels.extend(component.pixels),
            None => {
                root_to_index.insert(root, merged.len());
                merged.push(Component {
                    label: root,
                    pixels: component.pixels,
                });
            }
        }
    }
    merged
}

/// Label the grid with `num_bands` bands and merge across band borders.
pub fn label_components(grid: &mut PixelGrid, num_bands: usize) -> Vec<Component> {
    let ranges = plan_bands(grid.height, grid.width, num_bands);
    let raw = label_bands(grid, &ranges);
    merge_bands(grid, &ranges, raw)
}
