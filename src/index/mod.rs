//! Iteration spaces: segments and the tuples that bind them to loop arguments.
//!
//! A segment is an ordered, finite sequence of integer indices. Executors
//! never look at index values directly; they walk *offsets* `0..len` and
//! the segment maps an offset back to its index when a loop body runs.
//!
//! A segment tuple is a plain Rust tuple of segments. Position `k` in the
//! tuple is argument id `k`; `SegmentAt<k>` exists only for positions that
//! are actually present, so a statement naming a missing argument is a
//! compile error.


/// Maximum number of loop arguments (segments) in one kernel.
pub const MAX_ARGS: usize = 6;

// ─── Segment ──────────────────────────────────────────────────────

/// An ordered, finite, immutable sequence of indices.
pub trait Segment: Sync {
    /// Number of indices in the segment.
    fn len(&self) -> usize;

    /// The index stored at `offset`. Callers keep `offset < len()`.
    fn at(&self, offset: usize) -> i64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All indices in order.
    fn iter(&self) -> impl Iterator<Item = i64> + '_
    where
        Self: Sized,
    {
        (0..self.len()).map(move |offset| self.at(offset))
    }
}

impl<S: Segment + ?Sized> Segment for &S {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn at(&self, offset: usize) -> i64 {
        (**self).at(offset)
    }
}

fn saturate(len: u64) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}

/// Contiguous half-open range `[begin, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSegment {
    begin: i64,
    end: i64,
}

impl RangeSegment {
    /// An empty range results when `end <= begin`.
    pub fn new(begin: i64, end: i64) -> Self {
        Self { begin, end }
    }

    pub fn begin(&self) -> i64 {
        self.begin
    }

    pub fn end(&self) -> i64 {
        self.end
    }
}

impl Segment for RangeSegment {
    fn len(&self) -> usize {
        if self.end > self.begin {
            saturate(self.end.abs_diff(self.begin))
        } else {
            0
        }
    }

    fn at(&self, offset: usize) -> i64 {
        // In range for every offset below `len`, so wrapping is exact.
        self.begin.wrapping_add(offset as i64)
    }
}

/// Half-open range `[begin, end)` visited with a fixed, non-zero stride.
/// Negative strides walk downwards from `begin` towards `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeStrideSegment {
    begin: i64,
    end: i64,
    stride: i64,
}

impl RangeStrideSegment {
    /// # Panics
    /// Panics if `stride` is zero.
    pub fn new(begin: i64, end: i64, stride: i64) -> Self {
        assert_ne!(stride, 0, "RangeStrideSegment stride must be non-zero");
        Self { begin, end, stride }
    }

    pub fn stride(&self) -> i64 {
        self.stride
    }
}

impl Segment for RangeStrideSegment {
    fn len(&self) -> usize {
        let forward = if self.stride > 0 {
            self.end > self.begin
        } else {
            self.begin > self.end
        };
        if !forward {
            return 0;
        }
        let span = self.end.abs_diff(self.begin);
        saturate(span.div_ceil(self.stride.unsigned_abs()))
    }

    fn at(&self, offset: usize) -> i64 {
        self.begin.wrapping_add((offset as i64).wrapping_mul(self.stride))
    }
}

/// An explicit list of indices, visited in the order given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListSegment {
    values: Vec<i64>,
}

impl ListSegment {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }
}

impl From<Vec<i64>> for ListSegment {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<i64> for ListSegment {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Segment for ListSegment {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn at(&self, offset: usize) -> i64 {
        self.values[offset]
    }
}

// ─── Segment Tuples ───────────────────────────────────────────────

/// A fixed-arity tuple of segments, one per loop argument.
pub trait SegmentTuple: Sync {
    /// Number of segments (loop arguments).
    const ARITY: usize;

    /// Segment lengths by argument id; unused slots are zero.
    fn lengths(&self) -> [usize; MAX_ARGS];

    /// Index values at the given offsets. Slots past the arity, and
    /// offsets outside their segment, read as zero.
    fn values(&self, offsets: &[usize; MAX_ARGS]) -> [i64; MAX_ARGS];
}

/// Typed access to the segment bound to argument `ARG`.
pub trait SegmentAt<const ARG: usize>: SegmentTuple {
    type Seg: Segment;

    fn segment(&self) -> &Self::Seg;

    fn segment_len(&self) -> usize {
        self.segment().len()
    }
}

fn value_or_zero<S: Segment>(segment: &S, offset: usize) -> i64 {
    if offset < segment.len() {
        segment.at(offset)
    } else {
        0
    }
}

macro_rules! segment_tuple {
    (@each $all:tt $($idx:tt => $S:ident),+) => {
        $( segment_tuple!(@at $all $idx => $S); )+
    };
    (@at [$($all:ident),+] $idx:tt => $S:ident) => {
        impl<$($all: Segment),+> SegmentAt<$idx> for ($($all,)+) {
            type Seg = $S;

            fn segment(&self) -> &$S {
                &self.$idx
            }
        }
    };
    ($arity:expr; $($idx:tt => $S:ident),+) => {
        impl<$($S: Segment),+> SegmentTuple for ($($S,)+) {
            const ARITY: usize = $arity;

            fn lengths(&self) -> [usize; MAX_ARGS] {
                let mut out = [0; MAX_ARGS];
                $( out[$idx] = self.$idx.len(); )+
                out
            }

            fn values(&self, offsets: &[usize; MAX_ARGS]) -> [i64; MAX_ARGS] {
                let mut out = [0; MAX_ARGS];
                $( out[$idx] = value_or_zero(&self.$idx, offsets[$idx]); )+
                out
            }
        }

        segment_tuple!(@each [$($S),+] $($idx => $S),+);
    };
}

segment_tuple!(1; 0 => S0);
segment_tuple!(2; 0 => S0, 1 => S1);
segment_tuple!(3; 0 => S0, 1 => S1, 2 => S2);
segment_tuple!(4; 0 => S0, 1 => S1, 2 => S2, 3 => S3);
segment_tuple!(5; 0 => S0, 1 => S1, 2 => S2, 3 => S3, 4 => S4);
segment_tuple!(6; 0 => S0, 1 => S1, 2 => S2, 3 => S3, 4 => S4, 5 => S5);
