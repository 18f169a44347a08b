//! `launch` and the team loops.

use std::marker::PhantomData;

use super::shared::ScratchArena;
use super::{ExecPlace, LaunchContext, Resources};
use crate::device::{self, DeviceLimits};
use crate::error::LaunchError;
use crate::index::Segment;
use crate::policy::{DevicePolicy, HostPolicy, XyzPolicy};
use crate::space::{ExecSpace, ExecSpaceHook, ExecSpaceScope};

// ─── Policies ─────────────────────────────────────────────────────

/// Host and device strategies for `launch`, one of which is picked by the
/// runtime place.
pub struct LaunchPolicy<H, D>(PhantomData<fn() -> (H, D)>);

/// Host and device policies for `team_loop`, one of which is picked by
/// where the calling body runs.
pub struct LoopPolicy<H, D>(PhantomData<fn() -> (H, D)>);

pub trait LaunchPolicyPair {
    type Host: LaunchExecute;
    type Device: LaunchExecute;
}

impl<H: LaunchExecute, D: LaunchExecute> LaunchPolicyPair for LaunchPolicy<H, D> {
    type Host = H;
    type Device = D;
}

pub trait LoopPolicyPair {
    type Host;
    type Device;
}

impl<H, D> LoopPolicyPair for LoopPolicy<H, D> {
    type Host = H;
    type Device = D;
}

/// A strategy that runs a launch body over `resources`.
pub trait LaunchExecute {
    const SPACE: ExecSpace;

    fn exec<F>(limits: &DeviceLimits, resources: &Resources, body: &F) -> Result<(), LaunchError>
    where
        F: Fn(&LaunchContext<'_>) + Sync;
}

/// Runs the body once on the calling thread; team loops iterate the whole
/// space sequentially.
pub struct SeqLaunch;

/// Runs the body once per lane of the emulated device, one team per block.
pub struct DeviceLaunch;

impl LaunchExecute for SeqLaunch {
    const SPACE: ExecSpace = ExecSpace::Host;

    fn exec<F>(_limits: &DeviceLimits, resources: &Resources, body: &F) -> Result<(), LaunchError>
    where
        F: Fn(&LaunchContext<'_>) + Sync,
    {
        let scratch = ScratchArena::new(resources.shared_words);
        body(&LaunchContext::host(*resources, &scratch));
        Ok(())
    }
}

impl LaunchExecute for DeviceLaunch {
    const SPACE: ExecSpace = ExecSpace::Device;

    fn exec<F>(limits: &DeviceLimits, resources: &Resources, body: &F) -> Result<(), LaunchError>
    where
        F: Fn(&LaunchContext<'_>) + Sync,
    {
        let grid = resources.grid();
        for dim in 0..3 {
            let (threads, limit) = (grid.threads.get(dim), limits.max_block_dim[dim]);
            if threads > limit {
                return Err(LaunchError::BlockTooLarge {
                    requested: threads as u64,
                    limit: limit as u64,
                });
            }
            let (teams, limit) = (grid.blocks.get(dim), limits.max_grid_dim[dim]);
            if teams > limit {
                return Err(LaunchError::GridTooLarge {
                    dim,
                    requested: teams as u64,
                    limit: limit as u64,
                });
            }
        }
        if grid.threads.product() > limits.max_threads_per_block as u64 {
            return Err(LaunchError::BlockTooLarge {
                requested: grid.threads.product(),
                limit: limits.max_threads_per_block as u64,
            });
        }

        device::run_teams(
            grid,
            || ScratchArena::new(resources.shared_words),
            |lane, barrier, scratch| {
                body(&LaunchContext::device(*resources, *lane, barrier, scratch));
            },
        );
        Ok(())
    }
}

// ─── Launch ───────────────────────────────────────────────────────

/// Run `body` on `place` with default device limits and no hook.
pub fn launch<LP, F>(place: ExecPlace, resources: &Resources, body: F) -> Result<(), LaunchError>
where
    LP: LaunchPolicyPair,
    F: Fn(&LaunchContext<'_>) + Sync,
{
    launch_with::<LP, F, ()>(&DeviceLimits::default(), &(), place, resources, body)
}

/// Run `body` on `place`, checking the shape against `limits` and
/// notifying `hook` around the execution.
pub fn launch_with<LP, F, H>(
    limits: &DeviceLimits,
    hook: &H,
    place: ExecPlace,
    resources: &Resources,
    body: F,
) -> Result<(), LaunchError>
where
    LP: LaunchPolicyPair,
    F: Fn(&LaunchContext<'_>) + Sync,
    H: ExecSpaceHook + ?Sized,
{
    resources.validate()?;
    tracing::debug!(
        %place,
        teams = ?resources.teams.value,
        threads = ?resources.threads.value,
        shared_words = resources.shared_words,
        "team launch"
    );
    match place {
        ExecPlace::Host => {
            let _scope = ExecSpaceScope::enter(hook, <LP::Host as LaunchExecute>::SPACE);
            <LP::Host as LaunchExecute>::exec(limits, resources, &body)
        }
        ExecPlace::Device => {
            let _scope = ExecSpaceScope::enter(hook, <LP::Device as LaunchExecute>::SPACE);
            <LP::Device as LaunchExecute>::exec(limits, resources, &body)
        }
    }
}

// ─── Team Loops ───────────────────────────────────────────────────

/// One work-sharing loop level inside a launch body.
///
/// A body running on a device lane uses `LP::Device`; on the host it uses
/// `LP::Host`.
pub fn team_loop<LP, Sg, F>(ctx: &LaunchContext<'_>, segment: &Sg, body: F)
where
    LP: LoopPolicyPair,
    LP::Host: HostPolicy,
    LP::Device: DevicePolicy,
    Sg: Segment,
    F: Fn(i64) + Sync,
{
    let len = segment.len();
    match ctx.lane() {
        Some(lane) => {
            <LP::Device as DevicePolicy>::drive(len, lane, &mut (), |_, i| body(segment.at(i)));
        }
        None => {
            <LP::Host as HostPolicy>::drive(len, &mut (), &|_: &mut (), i| body(segment.at(i)));
        }
    }
}

/// Two-level loop: `body(i0, i1)` with segment 0 innermost. The device
/// policy maps segment k onto dimension k.
pub fn team_loop2<LP, S0, S1, F>(ctx: &LaunchContext<'_>, s0: &S0, s1: &S1, body: F)
where
    LP: LoopPolicyPair,
    LP::Host: HostPolicy,
    LP::Device: XyzPolicy,
    S0: Segment,
    S1: Segment,
    F: Fn(i64, i64) + Sync,
{
    let (n0, n1) = (s0.len(), s1.len());
    match ctx.lane() {
        Some(lane) => {
            let outer = |_: &mut (), j: usize| {
                let inner = |_: &mut (), i: usize| body(s0.at(i), s1.at(j));
                <<LP::Device as XyzPolicy>::Dim0 as DevicePolicy>::drive(n0, lane, &mut (), inner);
            };
            <<LP::Device as XyzPolicy>::Dim1 as DevicePolicy>::drive(n1, lane, &mut (), outer);
        }
        None => {
            <LP::Host as HostPolicy>::drive(n1, &mut (), &|_: &mut (), j| {
                <LP::Host as HostPolicy>::drive(n0, &mut (), &|_: &mut (), i| {
                    body(s0.at(i), s1.at(j))
                });
            });
        }
    }
}

/// Three-level loop: `body(i0, i1, i2)` with segment 0 innermost.
pub fn team_loop3<LP, S0, S1, S2, F>(
    ctx: &LaunchContext<'_>,
    s0: &S0,
    s1: &S1,
    s2: &S2,
    body: F,
) where
    LP: LoopPolicyPair,
    LP::Host: HostPolicy,
    LP::Device: XyzPolicy,
    S0: Segment,
    S1: Segment,
    S2: Segment,
    F: Fn(i64, i64, i64) + Sync,
{
    let (n0, n1, n2) = (s0.len(), s1.len(), s2.len());
    match ctx.lane() {
        Some(lane) => {
            let outer = |_: &mut (), k: usize| {
                let middle = |_: &mut (), j: usize| {
                    let inner = |_: &mut (), i: usize| body(s0.at(i), s1.at(j), s2.at(k));
                    <<LP::Device as XyzPolicy>::Dim0 as DevicePolicy>::drive(n0, lane, &mut (), inner);
                };
                <<LP::Device as XyzPolicy>::Dim1 as DevicePolicy>::drive(n1, lane, &mut (), middle);
            };
            <<LP::Device as XyzPolicy>::Dim2 as DevicePolicy>::drive(n2, lane, &mut (), outer);
        }
        None => {
            <LP::Host as HostPolicy>::drive(n2, &mut (), &|_: &mut (), k| {
                <LP::Host as HostPolicy>::drive(n1, &mut (), &|_: &mut (), j| {
                    <LP::Host as HostPolicy>::drive(n0, &mut (), &|_: &mut (), i| {
                        body(s0.at(i), s1.at(j), s2.at(k))
                    });
                });
            });
        }
    }
}
