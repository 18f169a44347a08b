//! Host executors.
//!
//! Each statement type implements `HostStatement` for the policies that
//! can run on the CPU. `For` and `ForICount` share [`step`]; the only
//! difference is the extra assignment run after the offset is set.

use super::data::{BodyAt, LoopData};
use super::statement::{Describe, For, ForICount, Lambda};
use crate::index::{Segment, SegmentAt, SegmentTuple};
use crate::policy::HostPolicy;
use crate::space::{ExecSpace, ExecSpaceHook, ExecSpaceScope};

/// Executes a statement (or statement list) on the host.
pub trait HostStatement<S, B>: Describe {
    fn exec(data: &mut LoopData<'_, S, B>);
}

impl<S, B> HostStatement<S, B> for () {
    #[inline]
    fn exec(_data: &mut LoopData<'_, S, B>) {}
}

macro_rules! host_list {
    ($($T:ident),+) => {
        impl<S, B, $($T: HostStatement<S, B>),+> HostStatement<S, B> for ($($T,)+) {
            #[inline]
            fn exec(data: &mut LoopData<'_, S, B>) {
                $( $T::exec(data); )+
            }
        }
    };
}

host_list!(T0);
host_list!(T0, T1);
host_list!(T0, T1, T2);
host_list!(T0, T1, T2, T3);
host_list!(T0, T1, T2, T3, T4);
host_list!(T0, T1, T2, T3, T4, T5);

impl<const I: usize, S: SegmentTuple, B: BodyAt<I>> HostStatement<S, B> for Lambda<I> {
    #[inline]
    fn exec(data: &mut LoopData<'_, S, B>) {
        data.invoke::<I>();
    }
}

/// Shared loop stepping for `For`-family statements: assign the offset,
/// run `extra`, then the enclosed statements.
fn step<'a, const ARG: usize, P, E, S, B, X>(data: &mut LoopData<'a, S, B>, extra: X)
where
    P: HostPolicy,
    E: HostStatement<S, B>,
    S: SegmentAt<ARG>,
    B: Sync,
    X: Fn(&mut LoopData<'a, S, B>, usize) + Sync,
{
    let len = data.segment_len::<ARG>();
    P::drive(len, data, &|data: &mut LoopData<'a, S, B>, i| {
        data.assign_offset::<ARG>(i);
        extra(data, i);
        E::exec(data);
    });
}

impl<const ARG: usize, P, E, S, B> HostStatement<S, B> for For<ARG, P, E>
where
    P: HostPolicy,
    E: HostStatement<S, B>,
    S: SegmentAt<ARG>,
    B: Sync,
{
    fn exec(data: &mut LoopData<'_, S, B>) {
        step::<ARG, P, E, S, B, _>(data, |_, _| {});
    }
}

impl<const ARG: usize, const PARAM: usize, P, E, S, B> HostStatement<S, B>
    for ForICount<ARG, PARAM, P, E>
where
    P: HostPolicy,
    E: HostStatement<S, B>,
    S: SegmentAt<ARG>,
    B: Sync,
{
    fn exec(data: &mut LoopData<'_, S, B>) {
        step::<ARG, P, E, S, B, _>(data, |data, i| data.assign_param::<PARAM>(i));
    }
}

// ─── Entry Points ─────────────────────────────────────────────────

/// Run the statement list `Pol` over `segments` with `bodies` on the host.
///
/// ```ignore
/// type Pol = (For<0, SeqExec, (Lambda<0>,)>,);
/// forall::<Pol, _, _>(&(RangeSegment::new(0, 10),), &(|ix: &Indices| { /* ... */ },));
/// ```
pub fn forall<Pol, S, B>(segments: &S, bodies: &B)
where
    Pol: HostStatement<S, B>,
    S: SegmentTuple,
    B: Sync,
{
    forall_with_hook::<Pol, S, B, ()>(&(), segments, bodies);
}

/// `forall`, notifying `hook` on entry to and exit from the host space.
pub fn forall_with_hook<Pol, S, B, H>(hook: &H, segments: &S, bodies: &B)
where
    Pol: HostStatement<S, B>,
    S: SegmentTuple,
    B: Sync,
    H: ExecSpaceHook + ?Sized,
{
    let _scope = ExecSpaceScope::enter(hook, ExecSpace::Host);
    tracing::debug!(policy = %Pol::describe(), lengths = ?segments.lengths(), "host forall");
    let mut data = LoopData::new(segments, bodies);
    Pol::exec(&mut data);
}

/// One-dimensional loop over a single segment with host policy `P`.
pub fn forall_segment<P, Sg, F>(segment: &Sg, body: F)
where
    P: HostPolicy,
    Sg: Segment,
    F: Fn(i64) + Sync,
{
    P::drive(segment.len(), &mut (), &|_: &mut (), i| body(segment.at(i)));
}
