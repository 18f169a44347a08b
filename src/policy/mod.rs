//! Execution policy tags.
//!
//! A policy decides how the indices of one loop dimension are distributed:
//!
//! | Policy                     | Host | Device | Iteration                               |
//! |----------------------------|------|--------|-----------------------------------------|
//! | `SeqExec`                  | yes  | yes    | `0..len`, strictly increasing           |
//! | `ParExec`                  | yes  | no     | rayon work sharing, lane-private data   |
//! | `Direct<U, DIM>`           | no   | yes    | one hardware unit per index, bounds-checked |
//! | `StrideLoop<U, DIM, MIN>`  | no   | yes    | start at unit index, step by unit extent |
//!
//! `U` is [`ThreadIdx`] (block-stride over threads) or [`BlockIdx`]
//! (grid-stride over blocks). Policies only exist as types; a policy used
//! in a context it has no driver for is a compile error.

pub mod multi;


use std::marker::PhantomData;

use rayon::prelude::*;

use crate::device::{extent, Lane, Unit};
use crate::kernel::LaunchDims;

pub use multi::{MultiPolicy, PolicyList};

// ─── Hardware Units ───────────────────────────────────────────────

/// Type-level hardware unit.
pub trait HwUnit: 'static {
    const UNIT: Unit;
}

/// Threads within a block.
pub struct ThreadIdx;

/// Blocks within the grid.
pub struct BlockIdx;

impl HwUnit for ThreadIdx {
    const UNIT: Unit = Unit::Thread;
}

impl HwUnit for BlockIdx {
    const UNIT: Unit = Unit::Block;
}

/// Hardware dimensions are x, y and z.
struct ValidDim<const DIM: usize>;

impl<const DIM: usize> ValidDim<DIM> {
    const INDEX: usize = {
        assert!(DIM < 3, "hardware dimension must be 0 (x), 1 (y) or 2 (z)");
        DIM
    };

    const NAME: char = match Self::INDEX {
        0 => 'x',
        1 => 'y',
        _ => 'z',
    };
}

// ─── Policy Tags ──────────────────────────────────────────────────

/// Plain sequential loop.
pub struct SeqExec;

/// Host work-sharing loop on the rayon pool.
pub struct ParExec;

/// One hardware unit per index along dimension `DIM`.
///
/// `DIM` is 0, 1 or 2; anything else fails to build:
///
/// ```compile_fail
/// use loopnest::policy::{Direct, ThreadIdx};
/// use loopnest::{forall_device, For, Indices, Lambda, RangeSegment};
///
/// type Pol = (For<0, Direct<ThreadIdx, 3>, (Lambda<0>,)>,);
/// let _ = forall_device::<Pol, _, _>(&(RangeSegment::new(0, 4),), &(|_: &Indices| {},));
/// ```
pub struct Direct<U, const DIM: usize>(PhantomData<U>);

/// Unit-stride loop along dimension `DIM`: each unit starts at its own
/// index and steps by the unit extent. `MIN` is the smallest extent the
/// loop asks the launch for.
///
/// ```compile_fail
/// use loopnest::policy::{BlockIdx, StrideLoop};
/// use loopnest::{launch_dims, For, Indices, Lambda, RangeSegment};
///
/// type Pol = (For<0, StrideLoop<BlockIdx, 5>, (Lambda<0>,)>,);
/// let _ = launch_dims::<Pol, _, _>(&(RangeSegment::new(0, 4),), &(|_: &Indices| {},));
/// ```
pub struct StrideLoop<U, const DIM: usize, const MIN: u32 = 1>(PhantomData<U>);

/// Sequential loop, the host team-loop policy.
pub type LoopExec = SeqExec;

pub type ThreadXDirect = Direct<ThreadIdx, 0>;
pub type ThreadYDirect = Direct<ThreadIdx, 1>;
pub type ThreadZDirect = Direct<ThreadIdx, 2>;
pub type ThreadXLoop<const MIN: u32 = 1> = StrideLoop<ThreadIdx, 0, MIN>;
pub type ThreadYLoop<const MIN: u32 = 1> = StrideLoop<ThreadIdx, 1, MIN>;
pub type ThreadZLoop<const MIN: u32 = 1> = StrideLoop<ThreadIdx, 2, MIN>;
pub type BlockXDirect = Direct<BlockIdx, 0>;
pub type BlockYDirect = Direct<BlockIdx, 1>;
pub type BlockZDirect = Direct<BlockIdx, 2>;
pub type BlockXLoop = StrideLoop<BlockIdx, 0>;
pub type BlockYLoop = StrideLoop<BlockIdx, 1>;
pub type BlockZLoop = StrideLoop<BlockIdx, 2>;

// ─── Names ────────────────────────────────────────────────────────

/// Human-readable policy name, used in statement descriptions and logs.
pub trait PolicyName {
    fn name() -> String;
}

impl PolicyName for SeqExec {
    fn name() -> String {
        "seq_exec".to_string()
    }
}

impl PolicyName for ParExec {
    fn name() -> String {
        "par_exec".to_string()
    }
}

impl<U: HwUnit, const DIM: usize> PolicyName for Direct<U, DIM> {
    fn name() -> String {
        format!("{}_{}_direct", U::UNIT, ValidDim::<DIM>::NAME)
    }
}

impl<U: HwUnit, const DIM: usize, const MIN: u32> PolicyName for StrideLoop<U, DIM, MIN> {
    fn name() -> String {
        if MIN > 1 {
            format!("{}_{}_loop<min={}>", U::UNIT, ValidDim::<DIM>::NAME, MIN)
        } else {
            format!("{}_{}_loop", U::UNIT, ValidDim::<DIM>::NAME)
        }
    }
}

// ─── Host Drivers ─────────────────────────────────────────────────

/// A policy that can drive a loop on the host.
pub trait HostPolicy: PolicyName {
    /// Call `f(data, i)` for every `i` in `0..len`. Parallel policies hand
    /// each iteration its own copy of `data`.
    fn drive<D, F>(len: usize, data: &mut D, f: &F)
    where
        D: Clone + Send + Sync,
        F: Fn(&mut D, usize) + Sync;
}

impl HostPolicy for SeqExec {
    fn drive<D, F>(len: usize, data: &mut D, f: &F)
    where
        D: Clone + Send + Sync,
        F: Fn(&mut D, usize) + Sync,
    {
        for i in 0..len {
            f(data, i);
        }
    }
}

impl HostPolicy for ParExec {
    fn drive<D, F>(len: usize, data: &mut D, f: &F)
    where
        D: Clone + Send + Sync,
        F: Fn(&mut D, usize) + Sync,
    {
        let shared: &D = data;
        (0..len).into_par_iter().for_each(|i| {
            let mut private = shared.clone();
            f(&mut private, i);
        });
    }
}

// ─── Device Drivers ───────────────────────────────────────────────

/// A policy that can drive a loop inside an emulated device lane.
pub trait DevicePolicy: PolicyName {
    /// The hardware `(unit, dimension)` this policy occupies, if any.
    const CLAIM: Option<(Unit, usize)>;

    /// Call `f(data, i)` for every index this lane owns, in increasing order.
    fn drive<D, F>(len: usize, lane: &Lane, data: &mut D, f: F)
    where
        F: FnMut(&mut D, usize);

    /// This statement's own requirement for a segment of `len` indices.
    fn dimensions(len: usize) -> LaunchDims;
}

impl DevicePolicy for SeqExec {
    const CLAIM: Option<(Unit, usize)> = None;

    fn drive<D, F>(len: usize, _lane: &Lane, data: &mut D, mut f: F)
    where
        F: FnMut(&mut D, usize),
    {
        for i in 0..len {
            f(data, i);
        }
    }

    fn dimensions(_len: usize) -> LaunchDims {
        LaunchDims::default()
    }
}

impl<U: HwUnit, const DIM: usize> DevicePolicy for Direct<U, DIM> {
    const CLAIM: Option<(Unit, usize)> = Some((U::UNIT, ValidDim::<DIM>::INDEX));

    fn drive<D, F>(len: usize, lane: &Lane, data: &mut D, mut f: F)
    where
        F: FnMut(&mut D, usize),
    {
        let dim = ValidDim::<DIM>::INDEX;
        // Over-provisioned lanes run nothing.
        let i = lane.index(U::UNIT, dim);
        if i < len {
            f(data, i);
        }
    }

    fn dimensions(len: usize) -> LaunchDims {
        let dim = ValidDim::<DIM>::INDEX;
        let mut dims = LaunchDims::default();
        match U::UNIT {
            Unit::Thread => {
                dims.threads.set(dim, extent(len));
                dims.min_threads.set(dim, extent(len));
            }
            Unit::Block => {
                dims.blocks.set(dim, extent(len));
                dims.min_blocks.set(dim, extent(len));
            }
        }
        dims
    }
}

impl<U: HwUnit, const DIM: usize, const MIN: u32> DevicePolicy for StrideLoop<U, DIM, MIN> {
    const CLAIM: Option<(Unit, usize)> = Some((U::UNIT, ValidDim::<DIM>::INDEX));

    fn drive<D, F>(len: usize, lane: &Lane, data: &mut D, mut f: F)
    where
        F: FnMut(&mut D, usize),
    {
        let dim = ValidDim::<DIM>::INDEX;
        let start = lane.index(U::UNIT, dim);
        let stride = lane.extent(U::UNIT, dim).max(1);
        for i in (start..len).step_by(stride) {
            f(data, i);
        }
    }

    fn dimensions(len: usize) -> LaunchDims {
        let dim = ValidDim::<DIM>::INDEX;
        let mut dims = LaunchDims::default();
        match U::UNIT {
            Unit::Thread => {
                dims.threads.set(dim, extent(len));
                dims.min_threads.set(dim, MIN);
            }
            Unit::Block => {
                dims.blocks.set(dim, extent(len));
                dims.min_blocks.set(dim, MIN);
            }
        }
        dims
    }
}

// ─── Multi-dimensional Team Loops ─────────────────────────────────

/// Policies for 2- and 3-segment team loops: segment `k` is driven by
/// `DimK`.
pub trait XyzPolicy {
    type Dim0: DevicePolicy;
    type Dim1: DevicePolicy;
    type Dim2: DevicePolicy;
}

/// Segment k mapped directly onto dimension k of `U`.
pub struct XyzDirect<U>(PhantomData<U>);

/// Segment k strided over dimension k of `U`.
pub struct XyzLoop<U>(PhantomData<U>);

impl XyzPolicy for SeqExec {
    type Dim0 = SeqExec;
    type Dim1 = SeqExec;
    type Dim2 = SeqExec;
}

impl<U: HwUnit> XyzPolicy for XyzDirect<U> {
    type Dim0 = Direct<U, 0>;
    type Dim1 = Direct<U, 1>;
    type Dim2 = Direct<U, 2>;
}

impl<U: HwUnit> XyzPolicy for XyzLoop<U> {
    type Dim0 = StrideLoop<U, 0>;
    type Dim1 = StrideLoop<U, 1>;
    type Dim2 = StrideLoop<U, 2>;
}

pub type ThreadXyzDirect = XyzDirect<ThreadIdx>;
pub type ThreadXyzLoop = XyzLoop<ThreadIdx>;
pub type BlockXyzDirect = XyzDirect<BlockIdx>;
pub type BlockXyzLoop = XyzLoop<BlockIdx>;
