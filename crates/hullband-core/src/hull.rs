#![allow(unsafe_code)]
//! Convex hulls of labeled components.
//!
//! Each hull is built by quickhull with an explicit segment stack. All
//! geometry uses exact integer cross products, so collinearity checks are exact.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use multiversion::multiversion;
use rayon::prelude::*;

use crate::image::Pixel;
use crate::segmentation::Component;

/// Oriented boundary `a -> b` of the half-plane searched during subdivision.
#[derive(Clone, Copy, Debug)]
pub struct LineSegment {
    /// Start point.
    pub a: Pixel,
    /// End point.
    pub b: Pixel,
}

impl LineSegment {
    /// Create a segment from `a` to `b`.
    #[must_use]
    pub const fn new(a: Pixel, b: Pixel) -> Self {
        Self { a, b }
    }
}

/// Ordered boundary vertices of a component's convex hull.
#[derive(Clone, Debug, Default)]
pub struct Hull {
    /// Vertices in traversal order.
    pub vertices: Vec<Pixel>,
}

impl Hull {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the hull has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Orientation of the turn `first -> second -> third`, with x = col and y = row.
///
/// Zero for collinear points. Negative values mark the side of `first -> second`
/// that quickhull searches for candidates.
#[inline]
#[must_use]
pub fn orientation(first: &Pixel, second: &Pixel, third: &Pixel) -> i64 {
    let (x1, y1) = (i64::from(first.col), i64::from(first.row));
    let (x2, y2) = (i64::from(second.col), i64::from(second.row));
    let (x3, y3) = (i64::from(third.col), i64::from(third.row));
    (x2 - x1) * (y3 - y2) - (y2 - y1) * (x3 - x2)
}

#[multiversion(targets(
    "x86_64+avx2+bmi1+bmi2+popcnt+lzcnt",
    "x86_64+avx512f+avx512bw+avx512dq+avx512vl",
    "aarch64+neon"
))]
/// Pixel strictly on the searched side of `segment` with the largest cross
/// product magnitude. The first one wins on ties.
fn find_farthest(pixels: &[Pixel], segment: &LineSegment) -> Option<Pixel> {
    let mut farthest = None;
    let mut max_dist = 0i64;
    for c in pixels {
        let turn = orientation(&segment.a, &segment.b, c);
        if turn < 0 && -turn > max_dist {
            max_dist = -turn;
            farthest = Some(*c);
        }
    }
    farthest
}

/// Extreme pixels: min column (then min row) and max column (then max row).
fn extreme_pixels(pixels: &[Pixel]) -> (Pixel, Pixel) {
    let mut left = pixels[0];
    let mut right = pixels[0];
    for &p in pixels {
        if p.col < left.col || (p.col == left.col && p.row < left.row) {
            left = p;
        }
        if p.col > right.col || (p.col == right.col && p.row > right.row) {
            right = p;
        }
    }
    (left, right)
}

/// Convex hull of one component.
///
/// Components with fewer than three pixels are their own hull. Exactly
/// collinear interior vertices are dropped; the first and last are always kept.
pub fn quickhull(component: &Component, arena: &Bump) -> Hull {
    let pixels = &component.pixels;
    if pixels.len() < 3 {
        return Hull {
            vertices: pixels.clone(),
        };
    }

    let (left, right) = extreme_pixels(pixels);

    let mut terminal = BumpVec::new_in(arena);
    let mut stack = BumpVec::new_in(arena);
    stack.push(LineSegment::new(left, right));
    stack.push(LineSegment::new(right, left));

    while let Some(segment) = stack.pop() {
        match find_farthest(pixels, &segment) {
            None => terminal.push(segment.a),
            Some(c) => {
                stack.push(LineSegment::new(segment.a, c));
                stack.push(LineSegment::new(c, segment.b));
            }
        }
    }

    // Emitted back to front
    terminal.reverse();

    let n = terminal.len();
    let vertices = terminal
        .iter()
        .enumerate()
        .filter(|&(i, p)| {
            i == 0 || i == n - 1 || orientation(&terminal[i - 1], p, &terminal[i + 1]) != 0
        })
        .map(|(_, p)| *p)
        .collect();

    Hull { vertices }
}

/// Build the hull of every component, optionally on the rayon pool.
///
/// Output order matches `components`.
pub fn build_hulls(components: &[Component], parallel: bool) -> Vec<Hull> {
    if parallel {
        components
            .par_iter()
            .map(|component| {
                // Thread-local arena for this component
                let arena = Bump::new();
                quickhull(component, &arena)
            })
            .collect()
    } else {
        let mut arena = Bump::new();
        components
            .iter()
            .map(|component| {
                arena.reset();
                quickhull(component, &arena)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn component_of(points: &[(u32, u32)]) -> Component {
        Component {
            label: 2,
            pixels: points.iter().map(|&(r, c)| Pixel::new(r, c, 2)).collect(),
        }
    }

    fn coords(hull: &Hull) -> Vec<(u32, u32)> {
        hull.vertices.iter().map(Pixel::coords).collect()
    }

    #[test]
    fn test_orientation_signs() {
        let a = Pixel::new(0, 0, 2);
        let b = Pixel::new(0, 2, 2);
        assert!(orientation(&a, &b, &Pixel::new(2, 2, 2)) > 0);
        assert_eq!(orientation(&a, &b, &Pixel::new(0, 1, 2)), 0);
        assert!(orientation(&b, &a, &Pixel::new(2, 2, 2)) < 0);
    }

    #[test]
    fn test_small_components_are_their_own_hull() {
        let arena = Bump::new();
        assert!(quickhull(&component_of(&[]), &arena).is_empty());
        let single = quickhull(&component_of(&[(4, 5)]), &arena);
        assert_eq!(coords(&single), vec![(4, 5)]);
        let pair = quickhull(&component_of(&[(0, 0), (9, 9)]), &arena);
        assert_eq!(coords(&pair), vec![(0, 0), (9, 9)]);
    }

    #[test]
    fn test_filled_square() {
        let arena = Bump::new();
        let mut points = Vec::new();
        for r in 0..3 {
            for c in 0..3 {
                points.push((r, c));
            }
        }
        let hull = quickhull(&component_of(&points), &arena);
        assert_eq!(coords(&hull), vec![(0, 0), (0, 2), (2, 2), (2, 0)]);
    }

    #[test]
    fn test_l_shape_hull() {
        let arena = Bump::new();
        let hull = quickhull(
            &component_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1), (3, 2)]),
            &arena,
        );
        assert_eq!(coords(&hull), vec![(0, 0), (3, 2), (3, 0)]);
    }

    #[test]
    fn test_collinear_row_keeps_endpoints() {
        let arena = Bump::new();
        let hull = quickhull(&component_of(&[(1, 0), (1, 1), (1, 2), (1, 3)]), &arena);
        assert_eq!(coords(&hull), vec![(1, 0), (1, 3)]);
    }

    #[test]
    fn test_collinear_column_keeps_endpoints() {
        let arena = Bump::new();
        let hull = quickhull(&component_of(&[(2, 5), (0, 5), (1, 5)]), &arena);
        assert_eq!(coords(&hull), vec![(0, 5), (2, 5)]);
    }

    #[test]
    fn test_build_hulls_keeps_order() {
        let components = vec![
            component_of(&[(0, 0)]),
            component_of(&[(5, 5), (5, 6), (6, 5)]),
        ];
        let par = build_hulls(&components, true);
        let seq = build_hulls(&components, false);
        assert_eq!(par.len(), 2);
        for (p, s) in par.iter().zip(&seq) {
            assert_eq!(coords(p), coords(s));
        }
        assert_eq!(coords(&par[0]), vec![(0, 0)]);
        assert_eq!(par[1].len(), 3);
    }

    proptest! {
        #[test]
        fn prop_hull_is_convex_and_encloses_points(
            raw in prop::collection::hash_set((0..40u32, 0..40u32), 3..120)
        ) {
            let points: Vec<(u32, u32)> = raw.into_iter().collect();
            let component = component_of(&points);
            let arena = Bump::new();
            let hull = quickhull(&component, &arena);
            let v = &hull.vertices;

            // Vertices are distinct input points
            let input: HashSet<(u32, u32)> = points.iter().copied().collect();
            let unique: HashSet<(u32, u32)> = v.iter().map(Pixel::coords).collect();
            prop_assert_eq!(unique.len(), v.len());
            prop_assert!(unique.is_subset(&input));
            prop_assert!(v.len() >= 2);

            // Every interior turn is strictly convex under one winding
            for i in 1..v.len().saturating_sub(1) {
                prop_assert!(orientation(&v[i - 1], &v[i], &v[i + 1]) > 0);
            }

            // No input point lies strictly outside any edge
            for i in 0..v.len() {
                let a = &v[i];
                let b = &v[(i + 1) % v.len()];
                for p in &component.pixels {
                    prop_assert!(orientation(a, b, p) >= 0);
                }
            }
        }
    }
}
