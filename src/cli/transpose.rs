//! Tiled matrix transpose through team-shared memory.
//!
//! Each team owns one `tile × tile` block of the input. Its threads copy
//! the block into a shared tile with stride-1 reads, synchronize, then
//! write the tile out with rows and columns swapped so the writes are
//! stride-1 too.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use loopnest::policy::{BlockXDirect, BlockYDirect, LoopExec, ThreadXDirect, ThreadYDirect};
use loopnest::teams::{DeviceLaunch, LaunchPolicy, LoopPolicy, SeqLaunch};
use loopnest::{
    launch_with, team_loop, DeviceLimits, ExecPlace, LaunchError, RangeSegment, Resources, Teams,
    Threads,
};

use super::{load_config, parse_place};

type Launch = LaunchPolicy<SeqLaunch, DeviceLaunch>;
type TeamsX = LoopPolicy<LoopExec, BlockXDirect>;
type TeamsY = LoopPolicy<LoopExec, BlockYDirect>;
type ThreadsX = LoopPolicy<LoopExec, ThreadXDirect>;
type ThreadsY = LoopPolicy<LoopExec, ThreadYDirect>;

pub fn cmd_transpose(
    place: Option<String>,
    rows: usize,
    cols: usize,
    tile: usize,
    config: Option<PathBuf>,
) {
    let cfg = load_config(config.as_deref());
    let place = place.map(|p| parse_place(&p)).unwrap_or(cfg.place);
    if rows == 0 || cols == 0 || tile == 0 {
        eprintln!("error: rows, cols and tile must be positive");
        process::exit(1);
    }

    let a: Vec<i32> = (0..rows * cols).map(|i| i as i32).collect();
    let expected = transpose_reference(&a, rows, cols);

    eprintln!("Transposing {}x{} with {}x{} tiles on the {}", rows, cols, tile, tile, place);
    let start = Instant::now();
    let at = match transpose_tiled(
        place,
        &cfg.device,
        cfg.resources.shared_words,
        &a,
        rows,
        cols,
        tile,
    ) {
        Ok(at) => at,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if at == expected {
        eprintln!("  result: PASS ({:.2?})", elapsed);
    } else {
        let wrong = at.iter().zip(&expected).filter(|(x, y)| x != y).count();
        eprintln!("  result: FAIL ({} of {} elements differ)", wrong, at.len());
        process::exit(1);
    }
}

/// Plain nested-loop transpose: `at[c][r] = a[r][c]`.
pub fn transpose_reference(a: &[i32], rows: usize, cols: usize) -> Vec<i32> {
    let mut at = vec![0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            at[c * rows + r] = a[r * cols + c];
        }
    }
    at
}

/// Team-based transpose of the row-major `rows × cols` matrix `a`.
pub fn transpose_tiled(
    place: ExecPlace,
    limits: &DeviceLimits,
    shared_words: usize,
    a: &[i32],
    rows: usize,
    cols: usize,
    tile: usize,
) -> Result<Vec<i32>, LaunchError> {
    let outer_c = (cols - 1) / tile + 1;
    let outer_r = (rows - 1) / tile + 1;
    let extent = |n: usize| {
        u32::try_from(n).map_err(|_| LaunchError::InvalidResources(format!("extent {n} too large")))
    };
    let resources = Resources::new(
        Teams::xy(extent(outer_c)?, extent(outer_r)?),
        Threads::xy(extent(tile)?, extent(tile)?),
    )
    .with_shared_words(shared_words);

    let at: Vec<AtomicI32> = (0..rows * cols).map(|_| AtomicI32::new(0)).collect();
    let failure = Mutex::new(None);
    let tiles = RangeSegment::new(0, tile as i64);

    launch_with::<Launch, _, _>(limits, &(), place, &resources, |ctx| {
        // Every lane makes the same allocation, so either all lanes of a
        // team get the tile or all of them return here.
        let shared = match ctx.team_shared::<i32>(tile * tile) {
            Ok(shared) => shared,
            Err(e) => {
                *failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(e);
                return;
            }
        };

        team_loop::<TeamsY, _, _>(ctx, &RangeSegment::new(0, outer_r as i64), |by| {
            team_loop::<TeamsX, _, _>(ctx, &RangeSegment::new(0, outer_c as i64), |bx| {
                let (by, bx) = (by as usize, bx as usize);

                team_loop::<ThreadsY, _, _>(ctx, &tiles, |ty| {
                    team_loop::<ThreadsX, _, _>(ctx, &tiles, |tx| {
                        let (ty, tx) = (ty as usize, tx as usize);
                        let (row, col) = (by * tile + ty, bx * tile + tx);
                        if row < rows && col < cols {
                            shared.set2(ty, tx, tile, a[row * cols + col]);
                        }
                    });
                });

                ctx.team_sync();

                team_loop::<ThreadsX, _, _>(ctx, &tiles, |tx| {
                    team_loop::<ThreadsY, _, _>(ctx, &tiles, |ty| {
                        let (ty, tx) = (ty as usize, tx as usize);
                        let (row, col) = (by * tile + ty, bx * tile + tx);
                        if row < rows && col < cols {
                            at[col * rows + row].store(shared.get2(ty, tx, tile), Ordering::Relaxed);
                        }
                    });
                });
            });
        });
    })?;

    if let Some(e) = failure.into_inner().unwrap_or_else(|p| p.into_inner()) {
        return Err(e);
    }
    Ok(at.into_iter().map(AtomicI32::into_inner).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize) -> Vec<i32> {
        (0..rows * cols).map(|i| i as i32 * 3 - 7).collect()
    }

    #[test]
    fn test_reference_transpose() {
        let a = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(transpose_reference(&a, 2, 3), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_host_and_device_match_reference() {
        let (rows, cols, tile) = (37, 29, 8);
        let a = matrix(rows, cols);
        let expected = transpose_reference(&a, rows, cols);
        for place in [ExecPlace::Host, ExecPlace::Device] {
            let at = transpose_tiled(place, &DeviceLimits::default(), 4096, &a, rows, cols, tile)
                .unwrap();
            assert_eq!(at, expected, "{place}");
        }
    }

    #[test]
    fn test_tile_larger_than_scratch() {
        let a = matrix(4, 4);
        let err = transpose_tiled(ExecPlace::Device, &DeviceLimits::default(), 8, &a, 4, 4, 4)
            .unwrap_err();
        assert_eq!(
            err,
            LaunchError::SharedMemoryExhausted {
                requested: 16,
                available: 8
            }
        );
    }
}
