//! SIMT device emulation.
//!
//! The device backend runs on the host: a launch grid of `blocks × threads`
//! lanes, each lane seeing its own `threadIdx`/`blockIdx`-style coordinates
//! through [`Lane`]. Two execution modes exist:
//!
//! - [`run_grid`]: lanes are independent (no barrier in scope). Every lane
//!   is scheduled on the rayon pool.
//! - [`run_teams`]: lanes of one block form a team that may synchronize.
//!   Each team runs as scoped OS threads sharing a `Barrier`; teams run
//!   concurrently on the rayon pool.
//!
//! Limits mirror CUDA defaults unless a real adapter is probed through wgpu
//! (see [`probe`]).

pub mod probe;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Barrier;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ─── Hardware Coordinates ─────────────────────────────────────────

/// Which level of the hardware hierarchy a policy maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// A thread within a block (`threadIdx` / `blockDim`).
    Thread,
    /// A block within the grid (`blockIdx` / `gridDim`).
    Block,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Thread => write!(f, "thread"),
            Unit::Block => write!(f, "block"),
        }
    }
}

/// Three-component extent or coordinate (x, y, z).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn ones() -> Self {
        Self::new(1, 1, 1)
    }

    /// Component `dim` (0 = x, 1 = y, 2 = z).
    pub fn get(&self, dim: usize) -> u32 {
        match dim {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("dimension {dim} out of range"),
        }
    }

    pub fn set(&mut self, dim: usize, value: u32) {
        match dim {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => panic!("dimension {dim} out of range"),
        }
    }

    /// Pointwise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Zero components ("no requirement") become one.
    pub fn at_least_one(self) -> Self {
        self.max(Self::ones())
    }

    pub fn product(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// Decompose a flat id (x fastest) into coordinates within `self`.
    pub fn unflatten(&self, flat: u64) -> Dim3 {
        let x = self.x.max(1) as u64;
        let y = self.y.max(1) as u64;
        Dim3::new((flat % x) as u32, ((flat / x) % y) as u32, (flat / (x * y)) as u32)
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[u32; 3]> for Dim3 {
    fn from(v: [u32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Saturating conversion from a segment length to a grid extent.
pub(crate) fn extent(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// The coordinates one emulated hardware lane observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lane {
    pub thread: Dim3,
    pub block: Dim3,
    pub block_dim: Dim3,
    pub grid_dim: Dim3,
}

impl Lane {
    /// Lane `thread` of block `block` in `grid`.
    pub fn new(grid: &Grid, block: Dim3, thread: Dim3) -> Self {
        Self {
            thread,
            block,
            block_dim: grid.threads,
            grid_dim: grid.blocks,
        }
    }

    /// The only lane of a 1×1 grid.
    pub fn single() -> Self {
        Self::new(&Grid::single(), Dim3::default(), Dim3::default())
    }

    /// Hardware index along `dim` for the given unit.
    pub fn index(&self, unit: Unit, dim: usize) -> usize {
        match unit {
            Unit::Thread => self.thread.get(dim) as usize,
            Unit::Block => self.block.get(dim) as usize,
        }
    }

    /// Hardware extent along `dim` for the given unit.
    pub fn extent(&self, unit: Unit, dim: usize) -> usize {
        match unit {
            Unit::Thread => self.block_dim.get(dim) as usize,
            Unit::Block => self.grid_dim.get(dim) as usize,
        }
    }
}

// ─── Grid ─────────────────────────────────────────────────────────

/// A concrete launch shape. All components are at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub blocks: Dim3,
    pub threads: Dim3,
}

impl Grid {
    pub fn new(blocks: Dim3, threads: Dim3) -> Self {
        Self {
            blocks: blocks.at_least_one(),
            threads: threads.at_least_one(),
        }
    }

    pub fn single() -> Self {
        Self::new(Dim3::ones(), Dim3::ones())
    }

    pub fn lane_count(&self) -> u64 {
        self.blocks.product() * self.threads.product()
    }

    /// Lane for a flat id; threads of one block are contiguous.
    pub fn lane(&self, flat: u64) -> Lane {
        let per_block = self.threads.product();
        Lane::new(
            self,
            self.blocks.unflatten(flat / per_block),
            self.threads.unflatten(flat % per_block),
        )
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blocks={} threads={}", self.blocks, self.threads)
    }
}

/// Run `f` once per lane with no cross-lane synchronization.
pub fn run_grid<F>(grid: Grid, f: F)
where
    F: Fn(&Lane) + Sync,
{
    tracing::trace!(%grid, lanes = grid.lane_count(), "run grid");
    (0..grid.lane_count())
        .into_par_iter()
        .for_each(|flat| f(&grid.lane(flat)));
}

/// Upper bound on team lanes alive at once. A team is never split, so a
/// single block larger than this still runs whole.
pub(crate) const MAX_LIVE_LANES: u64 = 2048;

/// Run `f` once per lane; lanes of the same block run concurrently and
/// share a barrier sized to the block plus a team state built by `init`.
///
/// Teams are started in waves of at most `MAX_LIVE_LANES / block size`
/// teams, each lane on its own OS thread.
///
/// Every lane of a team must reach each barrier the body waits on, or the
/// team deadlocks.
pub fn run_teams<T, I, F>(grid: Grid, init: I, f: F)
where
    T: Sync,
    I: Fn() -> T + Sync,
    F: Fn(&Lane, &Barrier, &T) + Sync,
{
    let per_block = grid.threads.product();
    let teams = grid.blocks.product();
    let wave = (MAX_LIVE_LANES / per_block).max(1);
    tracing::trace!(%grid, wave, "run teams");
    let mut first = 0;
    while first < teams {
        let last = (first + wave).min(teams);
        run_wave(grid, first..last, &init, &f);
        first = last;
    }
}

fn run_wave<T, I, F>(grid: Grid, teams: std::ops::Range<u64>, init: &I, f: &F)
where
    T: Sync,
    I: Fn() -> T + Sync,
    F: Fn(&Lane, &Barrier, &T) + Sync,
{
    let per_block = grid.threads.product();
    teams.into_par_iter().for_each(|b| {
        let block = grid.blocks.unflatten(b);
        let barrier = Barrier::new(per_block as usize);
        let team = init();
        std::thread::scope(|scope| {
            for t in 0..per_block {
                let lane = Lane::new(&grid, block, grid.threads.unflatten(t));
                let (barrier, team) = (&barrier, &team);
                scope.spawn(move || f(&lane, barrier, team));
            }
        });
    });
}

// ─── Limits ───────────────────────────────────────────────────────

/// Hardware limits a launch must respect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLimits {
    pub max_threads_per_block: u32,
    pub max_block_dim: [u32; 3],
    pub max_grid_dim: [u32; 3],
    pub warp_size: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_threads_per_block: 1024,
            max_block_dim: [1024, 1024, 64],
            max_grid_dim: [i32::MAX as u32, 65535, 65535],
            warp_size: 32,
        }
    }
}

impl DeviceLimits {
    /// Limits of the first real adapter, or the defaults without one.
    pub fn probe() -> Self {
        match probe::probe_adapter() {
            Some(adapter) => {
                tracing::debug!(name = %adapter.name, "using adapter limits");
                adapter.limits
            }
            None => Self::default(),
        }
    }
}
