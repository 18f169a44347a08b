//! Device executors for the emulated SIMT backend.
//!
//! Every statement answers three questions:
//! - `exec`: what does one lane do?
//! - `calculate_dimensions`: how large must the grid be? Computed
//!   bottom-up, merged by pointwise max, finished before any lane runs.
//! - `validate`: does it claim a hardware dimension an enclosing
//!   statement already owns?

use super::data::{BodyAt, LoopData};
use super::dims::LaunchDims;
use super::statement::{Describe, For, ForICount, Lambda};
use crate::device::{self, DeviceLimits, Grid, Lane, Unit};
use crate::error::LaunchError;
use crate::index::{SegmentAt, SegmentTuple};
use crate::policy::DevicePolicy;
use crate::space::{ExecSpace, ExecSpaceHook, ExecSpaceScope};

/// A hardware dimension held by a statement on the current nesting path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    pub unit: Unit,
    pub dim: usize,
    pub owner: String,
}

/// Executes a statement (or statement list) inside a device lane.
pub trait DeviceStatement<S, B>: Describe {
    fn exec(data: &mut LoopData<'_, S, B>, lane: &Lane);

    fn calculate_dimensions(data: &LoopData<'_, S, B>) -> LaunchDims;

    /// Check nesting coherence against the claims held by enclosing
    /// statements. Siblings may share a dimension.
    fn validate(claims: &mut Vec<Claim>) -> Result<(), LaunchError>;
}

impl<S, B> DeviceStatement<S, B> for () {
    #[inline]
    fn exec(_data: &mut LoopData<'_, S, B>, _lane: &Lane) {}

    fn calculate_dimensions(_data: &LoopData<'_, S, B>) -> LaunchDims {
        LaunchDims::default()
    }

    fn validate(_claims: &mut Vec<Claim>) -> Result<(), LaunchError> {
        Ok(())
    }
}

macro_rules! device_list {
    ($($T:ident),+) => {
        impl<S, B, $($T: DeviceStatement<S, B>),+> DeviceStatement<S, B> for ($($T,)+) {
            #[inline]
            fn exec(data: &mut LoopData<'_, S, B>, lane: &Lane) {
                $( $T::exec(data, lane); )+
            }

            fn calculate_dimensions(data: &LoopData<'_, S, B>) -> LaunchDims {
                LaunchDims::default()
                    $( .max($T::calculate_dimensions(data)) )+
            }

            fn validate(claims: &mut Vec<Claim>) -> Result<(), LaunchError> {
                $( $T::validate(claims)?; )+
                Ok(())
            }
        }
    };
}

device_list!(T0);
device_list!(T0, T1);
device_list!(T0, T1, T2);
device_list!(T0, T1, T2, T3);
device_list!(T0, T1, T2, T3, T4);
device_list!(T0, T1, T2, T3, T4, T5);

impl<const I: usize, S: SegmentTuple, B: BodyAt<I>> DeviceStatement<S, B> for Lambda<I> {
    #[inline]
    fn exec(data: &mut LoopData<'_, S, B>, _lane: &Lane) {
        data.invoke::<I>();
    }

    fn calculate_dimensions(_data: &LoopData<'_, S, B>) -> LaunchDims {
        LaunchDims::default()
    }

    fn validate(_claims: &mut Vec<Claim>) -> Result<(), LaunchError> {
        Ok(())
    }
}

fn step<'a, const ARG: usize, P, E, S, B, X>(data: &mut LoopData<'a, S, B>, lane: &Lane, extra: X)
where
    P: DevicePolicy,
    E: DeviceStatement<S, B>,
    S: SegmentAt<ARG>,
    X: Fn(&mut LoopData<'a, S, B>, usize),
{
    let len = data.segment_len::<ARG>();
    P::drive(len, lane, data, |data, i| {
        data.assign_offset::<ARG>(i);
        extra(data, i);
        E::exec(data, lane);
    });
}

fn dimensions<const ARG: usize, P, E, S, B>(data: &LoopData<'_, S, B>) -> LaunchDims
where
    P: DevicePolicy,
    E: DeviceStatement<S, B>,
    S: SegmentAt<ARG>,
{
    P::dimensions(data.segment_len::<ARG>()).max(E::calculate_dimensions(data))
}

fn validate<P, E, S, B>(owner: String, claims: &mut Vec<Claim>) -> Result<(), LaunchError>
where
    P: DevicePolicy,
    E: DeviceStatement<S, B>,
{
    let Some((unit, dim)) = P::CLAIM else {
        return E::validate(claims);
    };
    if let Some(outer) = claims.iter().find(|c| c.unit == unit && c.dim == dim) {
        return Err(LaunchError::DimensionConflict {
            unit,
            dim,
            outer: outer.owner.clone(),
            inner: owner,
        });
    }
    claims.push(Claim { unit, dim, owner });
    let result = E::validate(claims);
    claims.pop();
    result
}

impl<const ARG: usize, P, E, S, B> DeviceStatement<S, B> for For<ARG, P, E>
where
    P: DevicePolicy,
    E: DeviceStatement<S, B>,
    S: SegmentAt<ARG>,
{
    fn exec(data: &mut LoopData<'_, S, B>, lane: &Lane) {
        step::<ARG, P, E, S, B, _>(data, lane, |_, _| {});
    }

    fn calculate_dimensions(data: &LoopData<'_, S, B>) -> LaunchDims {
        dimensions::<ARG, P, E, S, B>(data)
    }

    fn validate(claims: &mut Vec<Claim>) -> Result<(), LaunchError> {
        validate::<P, E, S, B>(Self::head(), claims)
    }
}

impl<const ARG: usize, const PARAM: usize, P, E, S, B> DeviceStatement<S, B>
    for ForICount<ARG, PARAM, P, E>
where
    P: DevicePolicy,
    E: DeviceStatement<S, B>,
    S: SegmentAt<ARG>,
{
    fn exec(data: &mut LoopData<'_, S, B>, lane: &Lane) {
        step::<ARG, P, E, S, B, _>(data, lane, |data, i| data.assign_param::<PARAM>(i));
    }

    fn calculate_dimensions(data: &LoopData<'_, S, B>) -> LaunchDims {
        dimensions::<ARG, P, E, S, B>(data)
    }

    fn validate(claims: &mut Vec<Claim>) -> Result<(), LaunchError> {
        validate::<P, E, S, B>(Self::head(), claims)
    }
}

// ─── Entry Points ─────────────────────────────────────────────────

/// Launch the statement list `Pol` as a device kernel with default limits.
/// Returns the grid the kernel ran on.
pub fn forall_device<Pol, S, B>(segments: &S, bodies: &B) -> Result<Grid, LaunchError>
where
    Pol: DeviceStatement<S, B>,
    S: SegmentTuple,
    B: Sync,
{
    forall_device_with::<Pol, S, B, ()>(&DeviceLimits::default(), &(), segments, bodies)
}

/// Launch a device kernel against explicit limits and an execution-space
/// hook.
///
/// The tree is validated and the launch dimensions are computed and fitted
/// before the first lane runs; each lane works on its own copy of the loop
/// data.
pub fn forall_device_with<Pol, S, B, H>(
    limits: &DeviceLimits,
    hook: &H,
    segments: &S,
    bodies: &B,
) -> Result<Grid, LaunchError>
where
    Pol: DeviceStatement<S, B>,
    S: SegmentTuple,
    B: Sync,
    H: ExecSpaceHook + ?Sized,
{
    let _scope = ExecSpaceScope::enter(hook, ExecSpace::Device);
    Pol::validate(&mut Vec::new())?;

    let data = LoopData::new(segments, bodies);
    let dims = Pol::calculate_dimensions(&data);
    let grid = dims.fit(limits)?;
    tracing::debug!(policy = %Pol::describe(), %dims, %grid, "device kernel launch");

    device::run_grid(grid, |lane| {
        let mut private = data;
        Pol::exec(&mut private, lane);
    });
    Ok(grid)
}

/// Launch requirements of `Pol` over `segments`, without running anything.
pub fn launch_dims<Pol, S, B>(segments: &S, bodies: &B) -> LaunchDims
where
    Pol: DeviceStatement<S, B>,
    S: SegmentTuple,
{
    Pol::calculate_dimensions(&LoopData::new(segments, bodies))
}
