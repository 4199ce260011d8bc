#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use divan::bench;
use hullband_core::HullPipeline;
use hullband_core::codec::{pack_hulls, unpack_hulls};
use hullband_core::hull::build_hulls;
use hullband_core::image::MaskView;
use hullband_core::test_utils::blob_mask;
use rand::prelude::*;

fn main() {
    divan::main();
}

fn blobs_1080p() -> (Vec<u8>, usize, usize) {
    let (height, width) = (1080, 1920);
    let mut rng = StdRng::seed_from_u64(3);
    (blob_mask(&mut rng, height, width, 400), height, width)
}

#[bench(args = [false, true])]
fn bench_hulls_1080p_blobs(bencher: divan::Bencher, parallel: bool) {
    let (data, height, width) = blobs_1080p();
    let view = MaskView::new(&data, height, width).unwrap();
    let components = HullPipeline::new().run_full(&view).components;

    bencher.bench_local(|| build_hulls(&components, parallel));
}

#[bench]
fn bench_pack_unpack_1080p(bencher: divan::Bencher) {
    let (data, height, width) = blobs_1080p();
    let view = MaskView::new(&data, height, width).unwrap();
    let hulls = HullPipeline::new().run_full(&view).hulls;
    let mut hulls_indxs = vec![0u32; height * width];
    let mut pixels_indxs = vec![0u32; height * width];

    bencher.bench_local(|| {
        pack_hulls(&hulls, width, height, &mut hulls_indxs, &mut pixels_indxs);
        unpack_hulls(&hulls_indxs, &pixels_indxs, height, width, hulls.len())
    });
}

#[bench]
fn bench_full_pipeline_1080p(bencher: divan::Bencher) {
    let (data, height, width) = blobs_1080p();
    let view = MaskView::new(&data, height, width).unwrap();
    let pipeline = HullPipeline::new();
    let mut hulls_indxs = vec![0u32; height * width];
    let mut pixels_indxs = vec![0u32; height * width];

    bencher.bench_local(|| pipeline.run(&view, &mut hulls_indxs, &mut pixels_indxs));
}
