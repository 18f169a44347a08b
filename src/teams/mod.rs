//! Team-based launches.
//!
//! `launch` runs one body per lane of a `teams × threads` shape on a place
//! chosen at runtime; inside it, `team_loop` distributes an iteration space
//! with the host or device half of a [`LoopPolicy`], whichever matches where
//! the body is running. Lanes of a team cooperate through `team_sync` and
//! team-shared arrays.

pub mod launch;
pub mod shared;


use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

use serde::{Deserialize, Serialize};

use crate::device::{Dim3, Grid, Lane};
use crate::error::LaunchError;

pub use launch::{
    launch, launch_with, team_loop, team_loop2, team_loop3, DeviceLaunch, LaunchExecute,
    LaunchPolicy, LaunchPolicyPair, LoopPolicy, LoopPolicyPair, SeqLaunch,
};
pub use shared::{ScratchArena, TeamScratch, TeamSharedArray};

/// Scratch words per team unless the caller asks for more.
pub const DEFAULT_SHARED_WORDS: usize = 4096;

// ─── Execution Place ──────────────────────────────────────────────

/// Where a launch runs. Chosen at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecPlace {
    Host,
    Device,
}

impl TryFrom<i32> for ExecPlace {
    type Error = LaunchError;

    /// `0` is the host, `1` the device.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ExecPlace::Host),
            1 => Ok(ExecPlace::Device),
            other => Err(LaunchError::UnknownPlace(other.to_string())),
        }
    }
}

impl FromStr for ExecPlace {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" | "0" => Ok(ExecPlace::Host),
            "device" | "1" => Ok(ExecPlace::Device),
            _ => Err(LaunchError::UnknownPlace(s.to_string())),
        }
    }
}

impl fmt::Display for ExecPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecPlace::Host => write!(f, "host"),
            ExecPlace::Device => write!(f, "device"),
        }
    }
}

// ─── Resources ────────────────────────────────────────────────────

/// Number of teams along x, y, z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teams {
    pub value: [u32; 3],
}

impl Default for Teams {
    fn default() -> Self {
        Self { value: [1, 1, 1] }
    }
}

impl Teams {
    pub const fn new(x: u32) -> Self {
        Self { value: [x, 1, 1] }
    }

    pub const fn xy(x: u32, y: u32) -> Self {
        Self { value: [x, y, 1] }
    }

    pub const fn xyz(x: u32, y: u32, z: u32) -> Self {
        Self { value: [x, y, z] }
    }
}

/// Threads per team along x, y, z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Threads {
    pub value: [u32; 3],
}

impl Default for Threads {
    fn default() -> Self {
        Self { value: [1, 1, 1] }
    }
}

impl Threads {
    pub const fn new(x: u32) -> Self {
        Self { value: [x, 1, 1] }
    }

    pub const fn xy(x: u32, y: u32) -> Self {
        Self { value: [x, y, 1] }
    }

    pub const fn xyz(x: u32, y: u32, z: u32) -> Self {
        Self { value: [x, y, z] }
    }
}

/// Vector lanes per thread. Zero means "backend default".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lanes {
    pub value: u32,
}

impl Lanes {
    pub const fn new(value: u32) -> Self {
        Self { value }
    }
}

/// Requested shape of a team launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub teams: Teams,
    pub threads: Threads,
    pub lanes: Lanes,
    /// Team-shared scratch capacity in 8-byte words.
    pub shared_words: usize,
}

impl Default for Resources {
    fn default() -> Self {
        Self::new(Teams::default(), Threads::default())
    }
}

impl Resources {
    pub fn new(teams: Teams, threads: Threads) -> Self {
        Self {
            teams,
            threads,
            lanes: Lanes::default(),
            shared_words: DEFAULT_SHARED_WORDS,
        }
    }

    pub fn with_lanes(mut self, lanes: Lanes) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn with_shared_words(mut self, words: usize) -> Self {
        self.shared_words = words;
        self
    }

    /// Every team and thread extent must be positive.
    pub fn validate(&self) -> Result<(), LaunchError> {
        if let Some(dim) = self.teams.value.iter().position(|&v| v == 0) {
            return Err(LaunchError::InvalidResources(format!(
                "team extent {dim} is zero in {:?}",
                self.teams.value
            )));
        }
        if let Some(dim) = self.threads.value.iter().position(|&v| v == 0) {
            return Err(LaunchError::InvalidResources(format!(
                "thread extent {dim} is zero in {:?}",
                self.threads.value
            )));
        }
        Ok(())
    }

    /// The device grid for this shape: one block per team.
    pub fn grid(&self) -> Grid {
        Grid::new(Dim3::from(self.teams.value), Dim3::from(self.threads.value))
    }
}

// ─── Launch Context ───────────────────────────────────────────────

/// What a launch body receives: the resources, the place it runs on and,
/// on the device, the lane coordinates plus the team barrier and scratch.
pub struct LaunchContext<'t> {
    resources: Resources,
    place: ExecPlace,
    lane: Option<Lane>,
    barrier: Option<&'t Barrier>,
    scratch: &'t dyn TeamScratch,
    cursor: AtomicUsize,
}

impl<'t> LaunchContext<'t> {
    pub(crate) fn host(resources: Resources, scratch: &'t dyn TeamScratch) -> Self {
        Self {
            resources,
            place: ExecPlace::Host,
            lane: None,
            barrier: None,
            scratch,
            cursor: AtomicUsize::new(0),
        }
    }

    pub(crate) fn device(
        resources: Resources,
        lane: Lane,
        barrier: &'t Barrier,
        scratch: &'t dyn TeamScratch,
    ) -> Self {
        Self {
            resources,
            place: ExecPlace::Device,
            lane: Some(lane),
            barrier: Some(barrier),
            scratch,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn exec_place(&self) -> ExecPlace {
        self.place
    }

    /// The lane this body runs as; `None` on the host.
    pub fn lane(&self) -> Option<&Lane> {
        self.lane.as_ref()
    }

    /// Barrier across all lanes of the team. A no-op on the host.
    pub fn team_sync(&self) {
        if let Some(barrier) = self.barrier {
            barrier.wait();
        }
    }

    /// Carve a team-shared array of `len` elements out of the team scratch.
    ///
    /// Allocations live until the launch body returns. Lanes that perform
    /// the same sequence of allocations receive the same arrays, so
    /// allocate at the top of the body, not inside loops.
    pub fn team_shared<T: bytemuck::Pod>(
        &self,
        len: usize,
    ) -> Result<TeamSharedArray<'t, T>, LaunchError> {
        let start = self.cursor.load(Ordering::Relaxed);
        let available = self.scratch.capacity().saturating_sub(start);
        if len > available {
            return Err(LaunchError::SharedMemoryExhausted {
                requested: len,
                available,
            });
        }
        self.cursor.store(start + len, Ordering::Relaxed);
        Ok(TeamSharedArray::new(self.scratch.words(start, len)))
    }
}
