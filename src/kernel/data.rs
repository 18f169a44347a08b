//! The execution context threaded through a statement tree.

use crate::index::{SegmentAt, SegmentTuple, MAX_ARGS};

/// Number of auxiliary parameter slots (`ForICount` counters).
pub const MAX_PARAMS: usize = 6;

// ─── Indices ──────────────────────────────────────────────────────

/// What a loop body sees: the current index of every argument plus the
/// parameter slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Indices {
    values: [i64; MAX_ARGS],
    offsets: [usize; MAX_ARGS],
    params: [usize; MAX_PARAMS],
    arity: usize,
}

impl Indices {
    /// Segment value of argument `arg` at its current offset.
    ///
    /// # Panics
    /// Panics if `arg` is not below the segment tuple arity.
    pub fn get(&self, arg: usize) -> i64 {
        self.values()[arg]
    }

    /// Current offset (position within its segment) of argument `arg`.
    pub fn offset(&self, arg: usize) -> usize {
        self.offsets[..self.arity][arg]
    }

    /// Counter written by a `ForICount` into slot `param`.
    pub fn param(&self, param: usize) -> usize {
        self.params[param]
    }

    /// All argument values, in argument order.
    pub fn values(&self) -> &[i64] {
        &self.values[..self.arity]
    }
}

// ─── Bodies ───────────────────────────────────────────────────────

/// Loop body number `I` of a body tuple. `Lambda<I>` requires it, so a
/// missing body is a compile error.
pub trait BodyAt<const I: usize>: Sync {
    fn call(&self, indices: &Indices);
}

macro_rules! body_tuple {
    (@each $all:tt $($idx:tt => $B:ident),+) => {
        $( body_tuple!(@at $all $idx => $B); )+
    };
    (@at [$($all:ident),+] $idx:tt => $B:ident) => {
        impl<$($all: Fn(&Indices) + Sync),+> BodyAt<$idx> for ($($all,)+) {
            #[inline]
            fn call(&self, indices: &Indices) {
                (self.$idx)(indices)
            }
        }
    };
    ($($idx:tt => $B:ident),+) => {
        body_tuple!(@each [$($B),+] $($idx => $B),+);
    };
}

body_tuple!(0 => B0);
body_tuple!(0 => B0, 1 => B1);
body_tuple!(0 => B0, 1 => B1, 2 => B2);
body_tuple!(0 => B0, 1 => B1, 2 => B2, 3 => B3);
body_tuple!(0 => B0, 1 => B1, 2 => B2, 3 => B3, 4 => B4);
body_tuple!(0 => B0, 1 => B1, 2 => B2, 3 => B3, 4 => B4, 5 => B5);

// ─── LoopData ─────────────────────────────────────────────────────

/// Segments and bodies (borrowed) plus the current offsets and params
/// (owned).
///
/// Created once per `forall`, passed by `&mut` through the statement tree
/// and copied only where a parallel policy needs a lane-private instance.
pub struct LoopData<'a, S, B> {
    segments: &'a S,
    bodies: &'a B,
    offsets: [usize; MAX_ARGS],
    params: [usize; MAX_PARAMS],
}

impl<S, B> Clone for LoopData<'_, S, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, B> Copy for LoopData<'_, S, B> {}

impl<'a, S: SegmentTuple, B> LoopData<'a, S, B> {
    pub fn new(segments: &'a S, bodies: &'a B) -> Self {
        Self {
            segments,
            bodies,
            offsets: [0; MAX_ARGS],
            params: [0; MAX_PARAMS],
        }
    }

    pub fn segments(&self) -> &'a S {
        self.segments
    }

    pub fn segment_len<const ARG: usize>(&self) -> usize
    where
        S: SegmentAt<ARG>,
    {
        SegmentAt::<ARG>::segment_len(self.segments)
    }

    pub fn assign_offset<const ARG: usize>(&mut self, offset: usize)
    where
        S: SegmentAt<ARG>,
    {
        self.offsets[ARG] = offset;
    }

    pub fn assign_param<const PARAM: usize>(&mut self, value: usize) {
        const { assert!(PARAM < MAX_PARAMS, "param slot out of range") };
        self.params[PARAM] = value;
    }

    pub fn offsets(&self) -> &[usize; MAX_ARGS] {
        &self.offsets
    }

    pub fn params(&self) -> &[usize; MAX_PARAMS] {
        &self.params
    }

    /// Snapshot of the current indices for a loop body.
    pub fn indices(&self) -> Indices {
        Indices {
            values: self.segments.values(&self.offsets),
            offsets: self.offsets,
            params: self.params,
            arity: S::ARITY,
        }
    }

    /// Run body `I` with the current indices.
    pub fn invoke<const I: usize>(&self)
    where
        B: BodyAt<I>,
    {
        BodyAt::<I>::call(self.bodies, &self.indices());
    }
}
