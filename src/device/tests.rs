use super::*;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[test]
fn test_dim3_max_is_pointwise() {
    let a = Dim3::new(4, 0, 2);
    let b = Dim3::new(1, 7, 2);
    assert_eq!(a.max(b), Dim3::new(4, 7, 2));
    assert_eq!(Dim3::default().at_least_one(), Dim3::ones());
}

#[test]
fn test_dim3_unflatten_x_fastest() {
    let d = Dim3::new(4, 3, 2);
    assert_eq!(d.unflatten(0), Dim3::new(0, 0, 0));
    assert_eq!(d.unflatten(5), Dim3::new(1, 1, 0));
    assert_eq!(d.unflatten(23), Dim3::new(3, 2, 1));
}

#[test]
fn test_grid_lane_mapping() {
    let grid = Grid::new(Dim3::new(2, 1, 1), Dim3::new(3, 0, 0));
    assert_eq!(grid.threads, Dim3::new(3, 1, 1));
    assert_eq!(grid.lane_count(), 6);

    let lane = grid.lane(4);
    assert_eq!(lane.block, Dim3::new(1, 0, 0));
    assert_eq!(lane.thread, Dim3::new(1, 0, 0));
    assert_eq!(lane.index(Unit::Thread, 0), 1);
    assert_eq!(lane.extent(Unit::Thread, 0), 3);
    assert_eq!(lane.extent(Unit::Block, 0), 2);
}

#[test]
fn test_run_grid_visits_every_lane_once() {
    let grid = Grid::new(Dim3::new(3, 2, 1), Dim3::new(8, 2, 1));
    let seen = Mutex::new(Vec::new());
    run_grid(grid, |lane| {
        let flat = (lane.block.y * 3 + lane.block.x) * 16 + lane.thread.y * 8 + lane.thread.x;
        seen.lock().unwrap().push(flat);
    });
    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen, (0..96).collect::<Vec<u32>>());
}

#[test]
fn test_run_teams_barrier_orders_phases() {
    // Each lane writes its slot, waits, then reads its neighbour's slot.
    let grid = Grid::new(Dim3::new(2, 1, 1), Dim3::new(16, 1, 1));
    let slots: Vec<AtomicU64> = (0..32).map(|_| AtomicU64::new(0)).collect();
    let mismatches = AtomicUsize::new(0);
    run_teams(grid, || (), |lane, barrier, _| {
        let base = lane.block.x as usize * 16;
        let t = lane.thread.x as usize;
        slots[base + t].store(t as u64 + 1, Ordering::Relaxed);
        barrier.wait();
        let next = (t + 1) % 16;
        if slots[base + next].load(Ordering::Relaxed) != next as u64 + 1 {
            mismatches.fetch_add(1, Ordering::Relaxed);
        }
    });
    assert_eq!(mismatches.load(Ordering::Relaxed), 0);
}

#[test]
fn test_run_teams_builds_one_state_per_team() {
    let grid = Grid::new(Dim3::new(3, 2, 1), Dim3::new(4, 1, 1));
    let built = AtomicUsize::new(0);
    let visits = AtomicUsize::new(0);
    run_teams(
        grid,
        || {
            built.fetch_add(1, Ordering::Relaxed);
            AtomicUsize::new(0)
        },
        |_, barrier, team: &AtomicUsize| {
            team.fetch_add(1, Ordering::Relaxed);
            barrier.wait();
            assert_eq!(team.load(Ordering::Relaxed), 4);
            visits.fetch_add(1, Ordering::Relaxed);
        },
    );
    assert_eq!(built.load(Ordering::Relaxed), 6);
    assert_eq!(visits.load(Ordering::Relaxed), 24);
}

#[test]
fn test_run_teams_bounds_live_lanes() {
    let grid = Grid::new(Dim3::new(16, 1, 1), Dim3::new(1024, 1, 1));
    let live = AtomicU64::new(0);
    let peak = AtomicU64::new(0);
    let visits = AtomicUsize::new(0);
    run_teams(grid, || (), |_, barrier, _| {
        let now = live.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        barrier.wait();
        live.fetch_sub(1, Ordering::SeqCst);
        visits.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(visits.into_inner(), 16 * 1024);
    let peak = peak.into_inner();
    assert!(peak >= 1024, "whole team alive at its barrier, peak {peak}");
    assert!(peak <= MAX_LIVE_LANES, "peak {peak}");
}

#[test]
fn test_default_limits_are_cuda_like() {
    let limits = DeviceLimits::default();
    assert_eq!(limits.max_threads_per_block, 1024);
    assert_eq!(limits.max_block_dim, [1024, 1024, 64]);
    assert_eq!(limits.warp_size, 32);
}

#[test]
fn test_limits_from_wgpu_defaults() {
    let limits = probe::limits_from_wgpu(&wgpu::Limits::default());
    assert_eq!(limits.max_threads_per_block, 256);
    assert_eq!(limits.max_block_dim, [256, 256, 64]);
    assert_eq!(limits.max_grid_dim, [65535; 3]);
    assert_eq!(limits.warp_size, 32);
}
