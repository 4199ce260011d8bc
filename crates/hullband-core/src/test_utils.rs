//! Synthetic masks and reference results for tests and benchmarks.

use rand::prelude::*;

use crate::segmentation::Component;

/// Parse an ASCII mask: `#` is foreground, anything else background.
///
/// Returns `(data, height, width)`.
///
/// # Panics
/// Panics if rows have different lengths.
#[must_use]
pub fn mask_from_ascii(rows: &[&str]) -> (Vec<u8>, usize, usize) {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    let mut data = Vec::with_capacity(height * width);
    for row in rows {
        assert_eq!(row.len(), width, "ragged ASCII mask");
        data.extend(row.bytes().map(|b| u8::from(b == b'#')));
    }
    (data, height, width)
}

/// Random mask where each cell is foreground with probability `density`.
#[must_use]
pub fn random_mask<R: Rng>(rng: &mut R, height: usize, width: usize, density: f64) -> Vec<u8> {
    (0..height * width)
        .map(|_| u8::from(rng.gen_bool(density.clamp(0.0, 1.0))))
        .collect()
}

/// Mask with `count` filled axis-aligned blobs of random size on an empty canvas.
#[must_use]
pub fn blob_mask<R: Rng>(rng: &mut R, height: usize, width: usize, count: usize) -> Vec<u8> {
    let mut data = vec![0u8; height * width];
    if height == 0 || width == 0 {
        return data;
    }
    for _ in 0..count {
        let r0 = rng.gen_range(0..height);
        let c0 = rng.gen_range(0..width);
        let h = rng.gen_range(1..=(height / 8).max(1));
        let w = rng.gen_range(1..=(width / 8).max(1));
        for r in r0..(r0 + h).min(height) {
            for c in c0..(c0 + w).min(width) {
                data[r * width + c] = 1;
            }
        }
    }
    data
}

/// Single-threaded 8-connected flood fill over the whole mask.
///
/// Each component is returned as its sorted `(row, col)` list; the outer list is sorted too.
#[must_use]
pub fn reference_components(mask: &[u8], height: usize, width: usize) -> Vec<Vec<(u32, u32)>> {
    let mut seen = vec![false; height * width];
    let mut components = Vec::new();
    let mut queue = Vec::new();

    for start in 0..height * width {
        if mask[start] == 0 || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push(start);
        let mut members = Vec::new();
        while let Some(idx) = queue.pop() {
            let (r, c) = (idx / width, idx % width);
            members.push((r as u32, c as u32));
            for nr in r.saturating_sub(1)..=(r + 1).min(height - 1) {
                for nc in c.saturating_sub(1)..=(c + 1).min(width - 1) {
                    let n = nr * width + nc;
                    if mask[n] != 0 && !seen[n] {
                        seen[n] = true;
                        queue.push(n);
                    }
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }
    components.sort();
    components
}

/// Canonical form of a component list: sorted coordinate sets, sorted.
///
/// Independent of component order and of surviving label ids.
#[must_use]
pub fn sorted_component_sets(components: &[Component]) -> Vec<Vec<(u32, u32)>> {
    let mut sets: Vec<Vec<(u32, u32)>> = components
        .iter()
        .map(|c| {
            let mut coords: Vec<(u32, u32)> = c.pixels.iter().map(|p| p.coords()).collect();
            coords.sort_unstable();
            coords
        })
        .collect();
    sets.sort();
    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_ascii() {
        let (data, h, w) = mask_from_ascii(&["#.", ".#", "##"]);
        assert_eq!((h, w), (3, 2));
        assert_eq!(data, vec![1, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_reference_components_diagonal() {
        let (data, h, w) = mask_from_ascii(&["#..", ".#.", "...", "..#"]);
        let comps = reference_components(&data, h, w);
        assert_eq!(comps, vec![vec![(0, 0), (1, 1)], vec![(3, 2)]]);
    }

    #[test]
    fn test_random_mask_density_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(random_mask(&mut rng, 10, 10, 0.0).iter().all(|&v| v == 0));
        assert!(random_mask(&mut rng, 10, 10, 1.0).iter().all(|&v| v == 1));
    }
}
