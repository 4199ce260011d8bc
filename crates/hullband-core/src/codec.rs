//! Dense fixed-size encoding of a hull collection.
//!
//! Hulls are written into two row-major arrays the size of the image:
//! - `hulls_indxs[pos]`: 1-based id of the hull owning vertex `pos`, 0 if none.
//! - `pixels_indxs[pos]`: 1-based position of that vertex within its hull, 0 if none.
//!
//! The format has no pointers or lengths, so it can cross any task boundary as-is.

use crate::hull::Hull;
use crate::image::Pixel;

/// Write `hulls` into the two index buffers, zeroing everything else.
///
/// # Panics
/// Panics if either buffer is not exactly `height * width` long, or if a
/// vertex lies outside the image.
pub fn pack_hulls(
    hulls: &[Hull],
    width: usize,
    height: usize,
    hulls_indxs: &mut [u32],
    pixels_indxs: &mut [u32],
) {
    let size = height * width;
    assert_eq!(hulls_indxs.len(), size, "hulls_indxs must hold height * width entries");
    assert_eq!(pixels_indxs.len(), size, "pixels_indxs must hold height * width entries");

    hulls_indxs.fill(0);
    pixels_indxs.fill(0);

    for (hull_id, hull) in (1u32..).zip(hulls) {
        for (position, p) in (1u32..).zip(&hull.vertices) {
            assert!(
                (p.row as usize) < height && (p.col as usize) < width,
                "hull vertex ({}, {}) outside {}x{} image",
                p.row,
                p.col,
                height,
                width
            );
            let pos = p.index(width);
            hulls_indxs[pos] = hull_id;
            pixels_indxs[pos] = position;
        }
    }
}

/// Rebuild `hull_count` ordered hulls from the two index buffers.
///
/// Each vertex comes back with its 1-based position as its label. Hull ids
/// above `hull_count` are ignored.
///
/// # Panics
/// Panics if either buffer is shorter than `height * width`.
#[must_use]
pub fn unpack_hulls(
    hulls_indxs: &[u32],
    pixels_indxs: &[u32],
    height: usize,
    width: usize,
    hull_count: usize,
) -> Vec<Hull> {
    let size = height * width;
    let hulls_indxs = &hulls_indxs[..size];
    let pixels_indxs = &pixels_indxs[..size];

    let mut hulls = vec![Hull::default(); hull_count];
    if width == 0 {
        return hulls;
    }

    for (row, (hull_row, pixel_row)) in hulls_indxs
        .chunks_exact(width)
        .zip(pixels_indxs.chunks_exact(width))
        .enumerate()
    {
        for (col, (&hull_id, &position)) in hull_row.iter().zip(pixel_row).enumerate() {
            if hull_id == 0 {
                continue;
            }
            if let Some(hull) = hulls.get_mut(hull_id as usize - 1) {
                hull.vertices.push(Pixel::new(row as u32, col as u32, position));
            }
        }
    }

    for hull in &mut hulls {
        hull.vertices.sort_by_key(|p| p.label);
    }
    hulls
}
