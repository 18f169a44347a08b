//! Fixed-width registers and register-backed matrix tiles.
//!
//! A [`Register`] is a value of `N` lanes whose width is dictated by a
//! register policy: a SIMD width in bits, a single scalar lane, or one
//! element per thread of a warp. [`RegisterMatrix`] lays an `N × N` tile
//! over `N` registers in row- or column-major order, and [`RowIndex`] /
//! [`ColIndex`] address its rows and columns.

pub mod index;
pub mod matrix;

#[cfg(test)]
mod tests;

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Sub};

pub use index::{to_col_index, to_row_index, ColIndex, RowIndex, TileShape};
pub use matrix::{ColMajor, Layout, RegisterMatrix, RowMajor};

// ─── Elements ─────────────────────────────────────────────────────

/// Scalar types a register can hold.
pub trait Element:
    bytemuck::Pod
    + PartialOrd
    + fmt::Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;

    /// `self * a + b`, fused where the type supports it.
    fn mul_add(self, a: Self, b: Self) -> Self;
}

macro_rules! float_element {
    ($($t:ty),+) => {$(
        impl Element for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn mul_add(self, a: Self, b: Self) -> Self {
                <$t>::mul_add(self, a, b)
            }
        }
    )+};
}

macro_rules! int_element {
    ($($t:ty),+) => {$(
        impl Element for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn mul_add(self, a: Self, b: Self) -> Self {
                self * a + b
            }
        }
    )+};
}

float_element!(f32, f64);
int_element!(i32, i64, u32, u64);

fn pick<T: Element>(a: T, b: T, take_a: bool) -> T {
    if take_a {
        a
    } else {
        b
    }
}

// ─── Register Policies ────────────────────────────────────────────

/// Target register kind. A policy either has a width in bits (lanes =
/// bits / element bits) or a fixed lane count.
pub trait RegisterPolicy: 'static {
    const NAME: &'static str;
    const BITS: usize = 0;
    const FIXED_LANES: usize = 0;
}

/// One lane; the portable fallback.
pub struct ScalarRegister;

/// 128-bit SIMD (SSE, NEON).
pub struct Simd128;

/// 256-bit SIMD (AVX2).
pub struct Simd256;

/// 512-bit SIMD (AVX-512).
pub struct Simd512;

/// One element per thread of a `2^LANE_BITS`-wide warp.
pub struct CudaWarp<const LANE_BITS: u32 = 5>;

impl RegisterPolicy for ScalarRegister {
    const NAME: &'static str = "scalar";
    const FIXED_LANES: usize = 1;
}

impl RegisterPolicy for Simd128 {
    const NAME: &'static str = "simd128";
    const BITS: usize = 128;
}

impl RegisterPolicy for Simd256 {
    const NAME: &'static str = "simd256";
    const BITS: usize = 256;
}

impl RegisterPolicy for Simd512 {
    const NAME: &'static str = "simd512";
    const BITS: usize = 512;
}

impl<const LANE_BITS: u32> RegisterPolicy for CudaWarp<LANE_BITS> {
    const NAME: &'static str = "cuda_warp";
    const FIXED_LANES: usize = 1 << LANE_BITS;
}

/// Native lane count of policy `P` for element type `T`.
pub const fn lanes<T, P: RegisterPolicy>() -> usize {
    if P::FIXED_LANES > 0 {
        P::FIXED_LANES
    } else {
        P::BITS / (std::mem::size_of::<T>() * 8)
    }
}

// ─── Register ─────────────────────────────────────────────────────

/// `N` lanes of `T` targeting register kind `P`. `N` must equal the
/// policy's native lane count for `T`; anything else fails to compile.
pub struct Register<T, const N: usize, P> {
    lanes: [T; N],
    _policy: PhantomData<fn() -> P>,
}

impl<T: Copy, const N: usize, P> Clone for Register<T, N, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, const N: usize, P> Copy for Register<T, N, P> {}

impl<T: PartialEq, const N: usize, P> PartialEq for Register<T, N, P> {
    fn eq(&self, other: &Self) -> bool {
        self.lanes == other.lanes
    }
}

impl<T: fmt::Debug, const N: usize, P: RegisterPolicy> fmt::Debug for Register<T, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", P::NAME, self.lanes)
    }
}

impl<T: Element, const N: usize, P: RegisterPolicy> Register<T, N, P> {
    pub const LANES: usize = N;

    /// ```compile_fail
    /// use loopnest::register::{Register, Simd256};
    ///
    /// // A 256-bit register holds four f64 lanes, not eight.
    /// let _ = Register::<f64, 8, Simd256>::new([0.0; 8]);
    /// ```
    pub fn new(values: [T; N]) -> Self {
        const { assert!(N == lanes::<T, P>(), "lane count does not match the register policy") };
        Self {
            lanes: values,
            _policy: PhantomData,
        }
    }

    pub fn broadcast(value: T) -> Self {
        Self::new([value; N])
    }

    pub fn zero() -> Self {
        Self::broadcast(T::ZERO)
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self::new(std::array::from_fn(f))
    }

    pub fn get(&self, lane: usize) -> T {
        self.lanes[lane]
    }

    pub fn set(&mut self, lane: usize, value: T) {
        self.lanes[lane] = value;
    }

    pub fn to_array(self) -> [T; N] {
        self.lanes
    }

    // ─── Memory ───────────────────────────────────────────────

    /// Load `N` contiguous elements.
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `N` elements.
    pub fn load_packed(src: &[T]) -> Self {
        Self::from_fn(|i| src[i])
    }

    /// Load `N` elements `stride` apart.
    pub fn load_strided(src: &[T], stride: usize) -> Self {
        Self::from_fn(|i| src[i * stride])
    }

    /// Load the first `len` lanes from `src` (packed); the rest are zero.
    pub fn load_partial(src: &[T], len: usize) -> Self {
        Self::from_fn(|i| if i < len { src[i] } else { T::ZERO })
    }

    /// Load the first `len` lanes `stride` apart; the rest are zero.
    pub fn load_partial_strided(src: &[T], stride: usize, len: usize) -> Self {
        Self::from_fn(|i| if i < len { src[i * stride] } else { T::ZERO })
    }

    pub fn store_packed(&self, dst: &mut [T]) {
        dst[..N].copy_from_slice(&self.lanes);
    }

    pub fn store_strided(&self, dst: &mut [T], stride: usize) {
        for (i, &v) in self.lanes.iter().enumerate() {
            dst[i * stride] = v;
        }
    }

    pub fn store_partial(&self, dst: &mut [T], len: usize) {
        dst[..len.min(N)].copy_from_slice(&self.lanes[..len.min(N)]);
    }

    pub fn store_partial_strided(&self, dst: &mut [T], stride: usize, len: usize) {
        for (i, &v) in self.lanes.iter().take(len).enumerate() {
            dst[i * stride] = v;
        }
    }

    /// Raw bytes of all lanes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lanes[..])
    }

    // ─── Arithmetic ───────────────────────────────────────────

    fn zip(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        Self::from_fn(|i| f(self.lanes[i], other.lanes[i]))
    }

    /// `self * b + c`, lane-wise.
    pub fn fma(self, b: Self, c: Self) -> Self {
        Self::from_fn(|i| self.lanes[i].mul_add(b.lanes[i], c.lanes[i]))
    }

    pub fn min(self, other: Self) -> Self {
        self.zip(other, |a, b| pick(a, b, a <= b))
    }

    pub fn max(self, other: Self) -> Self {
        self.zip(other, |a, b| pick(a, b, a >= b))
    }

    pub fn scale(self, s: T) -> Self {
        self * Self::broadcast(s)
    }

    // ─── Reductions ───────────────────────────────────────────

    pub fn sum(&self) -> T {
        self.lanes.iter().fold(T::ZERO, |acc, &v| acc + v)
    }

    pub fn min_lane(&self) -> T {
        self.lanes[1..]
            .iter()
            .fold(self.lanes[0], |acc, &v| pick(v, acc, v < acc))
    }

    pub fn max_lane(&self) -> T {
        self.lanes[1..]
            .iter()
            .fold(self.lanes[0], |acc, &v| pick(v, acc, v > acc))
    }

    pub fn dot(&self, other: &Self) -> T {
        self.lanes
            .iter()
            .zip(other.lanes.iter())
            .fold(T::ZERO, |acc, (&a, &b)| a.mul_add(b, acc))
    }
}

macro_rules! lane_op {
    ($($Op:ident :: $op:ident),+) => {$(
        impl<T: Element, const N: usize, P: RegisterPolicy> $Op for Register<T, N, P> {
            type Output = Self;

            #[inline]
            fn $op(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a.$op(b))
            }
        }
    )+};
}

lane_op!(Add::add, Sub::sub, Mul::mul, Div::div);
