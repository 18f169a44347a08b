use std::path::PathBuf;
use std::process;

use loopnest::policy::{BlockXLoop, ThreadXLoop, ThreadYDirect};
use loopnest::{launch_dims, Describe, For, Indices, Lambda, RangeSegment};

use super::load_config;

/// A 2-D kernel: rows on blocks (grid-stride), columns split over
/// `threadIdx.x` (block-stride, at least 32) and a direct `threadIdx.y`
/// batch dimension.
type SamplePolicy = (
    For<2, ThreadYDirect, (
        For<1, BlockXLoop, (
            For<0, ThreadXLoop<32>, (Lambda<0>,)>,
        )>,
    )>,
);

pub fn cmd_dims(rows: i64, cols: i64, batch: i64, config: Option<PathBuf>) {
    let cfg = load_config(config.as_deref());
    let segments = (
        RangeSegment::new(0, cols),
        RangeSegment::new(0, rows),
        RangeSegment::new(0, batch),
    );
    let bodies = (|_: &Indices| {},);
    let dims = launch_dims::<SamplePolicy, _, _>(&segments, &bodies);

    println!("policy:");
    print!("{}", SamplePolicy::describe());
    println!("requirements: {}", dims);
    match dims.fit(&cfg.device) {
        Ok(grid) => println!("grid: {}", grid),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
