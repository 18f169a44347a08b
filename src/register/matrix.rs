//! `N × N` tiles over `N` registers.

use std::fmt;
use std::ops::{Add, Sub};

use super::index::{ColIndex, RowIndex};
use super::{Element, Register, RegisterPolicy};

/// Storage order of a [`RegisterMatrix`]. Element access and the
/// matrix-vector kernel depend on it.
pub trait Layout: 'static {
    const NAME: &'static str;

    /// `(register, lane)` holding element `(row, col)`.
    fn slot(row: usize, col: usize) -> (usize, usize);

    /// `y = A x` over this layout's registers.
    fn matvec<T: Element, const N: usize, P: RegisterPolicy>(
        regs: &[Register<T, N, P>; N],
        x: &Register<T, N, P>,
    ) -> Register<T, N, P>;
}

/// Register `r` holds row `r`.
pub struct RowMajor;

/// Register `c` holds column `c`.
pub struct ColMajor;

impl Layout for RowMajor {
    const NAME: &'static str = "row_major";

    fn slot(row: usize, col: usize) -> (usize, usize) {
        (row, col)
    }

    /// One dot product per row.
    fn matvec<T: Element, const N: usize, P: RegisterPolicy>(
        regs: &[Register<T, N, P>; N],
        x: &Register<T, N, P>,
    ) -> Register<T, N, P> {
        Register::from_fn(|r| regs[r].dot(x))
    }
}

impl Layout for ColMajor {
    const NAME: &'static str = "col_major";

    fn slot(row: usize, col: usize) -> (usize, usize) {
        (col, row)
    }

    /// Accumulate `x[c] * column c`.
    fn matvec<T: Element, const N: usize, P: RegisterPolicy>(
        regs: &[Register<T, N, P>; N],
        x: &Register<T, N, P>,
    ) -> Register<T, N, P> {
        regs.iter()
            .enumerate()
            .fold(Register::zero(), |acc, (c, col)| {
                Register::broadcast(x.get(c)).fma(*col, acc)
            })
    }
}

/// An `N × N` tile of `T` stored in `N` registers of policy `P`.
pub struct RegisterMatrix<T, L, const N: usize, P> {
    regs: [Register<T, N, P>; N],
    _layout: std::marker::PhantomData<fn() -> L>,
}

impl<T: Copy, L, const N: usize, P> Clone for RegisterMatrix<T, L, N, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, L, const N: usize, P> Copy for RegisterMatrix<T, L, N, P> {}

impl<T: PartialEq, L, const N: usize, P> PartialEq for RegisterMatrix<T, L, N, P> {
    fn eq(&self, other: &Self) -> bool {
        self.regs == other.regs
    }
}

impl<T: Element, L: Layout, const N: usize, P: RegisterPolicy> fmt::Debug
    for RegisterMatrix<T, L, N, P>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = f.debug_list();
        for r in 0..N {
            rows.entry(&self.row(r).to_array());
        }
        rows.finish()
    }
}

impl<T: Element, L: Layout, const N: usize, P: RegisterPolicy> RegisterMatrix<T, L, N, P> {
    pub fn from_registers(regs: [Register<T, N, P>; N]) -> Self {
        Self {
            regs,
            _layout: std::marker::PhantomData,
        }
    }

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut m = Self::zero();
        for r in 0..N {
            for c in 0..N {
                m.set(r, c, f(r, c));
            }
        }
        m
    }

    pub fn broadcast(value: T) -> Self {
        Self::from_registers([Register::broadcast(value); N])
    }

    pub fn zero() -> Self {
        Self::broadcast(T::ZERO)
    }

    pub fn identity() -> Self {
        let mut m = Self::zero();
        for i in 0..N {
            m.set(i, i, T::ONE);
        }
        m
    }

    pub fn registers(&self) -> &[Register<T, N, P>; N] {
        &self.regs
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        let (reg, lane) = L::slot(row, col);
        self.regs[reg].get(lane)
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let (reg, lane) = L::slot(row, col);
        self.regs[reg].set(lane, value);
    }

    pub fn row(&self, r: usize) -> Register<T, N, P> {
        Register::from_fn(|c| self.get(r, c))
    }

    pub fn col(&self, c: usize) -> Register<T, N, P> {
        Register::from_fn(|r| self.get(r, c))
    }

    pub fn set_row(&mut self, r: usize, values: Register<T, N, P>) {
        for c in 0..N {
            self.set(r, c, values.get(c));
        }
    }

    pub fn set_col(&mut self, c: usize, values: Register<T, N, P>) {
        for r in 0..N {
            self.set(r, c, values.get(r));
        }
    }

    // ─── Memory ───────────────────────────────────────────────

    /// Load a tile from a row-major 2-D slice with `ld` elements per row.
    ///
    /// `row` and `col` give the tile origin; their sizes bound the part of
    /// the tile that is read. Elements outside it are zero.
    pub fn load(src: &[T], ld: usize, row: RowIndex<usize, Self>, col: ColIndex<usize, Self>) -> Self {
        let (rows, cols) = (row.size().min(N), col.size().min(N));
        Self::from_fn(|r, c| {
            if r < rows && c < cols {
                src[(*row + r) * ld + *col + c]
            } else {
                T::ZERO
            }
        })
    }

    /// Store the `row.size() × col.size()` part of the tile into a
    /// row-major 2-D slice with `ld` elements per row.
    pub fn store(&self, dst: &mut [T], ld: usize, row: RowIndex<usize, Self>, col: ColIndex<usize, Self>) {
        for r in 0..row.size().min(N) {
            for c in 0..col.size().min(N) {
                dst[(*row + r) * ld + *col + c] = self.get(r, c);
            }
        }
    }

    // ─── Arithmetic ───────────────────────────────────────────

    pub fn transpose(&self) -> Self {
        Self::from_fn(|r, c| self.get(c, r))
    }

    pub fn scale(&self, s: T) -> Self {
        Self::from_registers(self.regs.map(|reg| reg.scale(s)))
    }

    /// `A x`.
    pub fn matvec(&self, x: &Register<T, N, P>) -> Register<T, N, P> {
        L::matvec(&self.regs, x)
    }

    /// `A B`: row `r` of the product accumulates `A[r][k] * row k of B`.
    pub fn matmul(&self, other: &Self) -> Self {
        let mut out = Self::zero();
        for r in 0..N {
            let acc = (0..N).fold(Register::zero(), |acc, k| {
                Register::broadcast(self.get(r, k)).fma(other.row(k), acc)
            });
            out.set_row(r, acc);
        }
        out
    }
}

impl<T: Element, L: Layout, const N: usize, P: RegisterPolicy> Add for RegisterMatrix<T, L, N, P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut regs = self.regs;
        for (a, b) in regs.iter_mut().zip(rhs.regs) {
            *a = *a + b;
        }
        Self::from_registers(regs)
    }
}

impl<T: Element, L: Layout, const N: usize, P: RegisterPolicy> Sub for RegisterMatrix<T, L, N, P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut regs = self.regs;
        for (a, b) in regs.iter_mut().zip(rhs.regs) {
            *a = *a - b;
        }
        Self::from_registers(regs)
    }
}
