//! Row and column indices over a matrix or register type.
//!
//! Both are an index plus an extent, tagged with the matrix type `M` they
//! address. Converting one into the other relabels the axis and keeps the
//! numbers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;

use super::matrix::RegisterMatrix;
use super::Register;

/// Types that are iterated in fixed-size tiles.
pub trait TileShape {
    const TILE: usize;
}

impl<T, L, const N: usize, P> TileShape for RegisterMatrix<T, L, N, P> {
    const TILE: usize = N;
}

impl<T, const N: usize, P> TileShape for Register<T, N, P> {
    const TILE: usize = N;
}

macro_rules! axis_index {
    ($(#[$doc:meta])* $Name:ident) => {
        $(#[$doc])*
        pub struct $Name<I, M> {
            index: I,
            size: I,
            _matrix: PhantomData<fn() -> M>,
        }

        impl<I, M> $Name<I, M> {
            pub const fn new(index: I, size: I) -> Self {
                Self {
                    index,
                    size,
                    _matrix: PhantomData,
                }
            }

            pub fn index(&self) -> I
            where
                I: Copy,
            {
                self.index
            }

            pub fn size(&self) -> I
            where
                I: Copy,
            {
                self.size
            }
        }

        impl<M: TileShape> $Name<usize, M> {
            /// Tiles covering `0..len`: full tiles of `M::TILE`, then one
            /// partial tile for the remainder.
            pub fn tiles(len: usize) -> impl Iterator<Item = Self> {
                let tile = M::TILE.max(1);
                (0..len)
                    .step_by(tile)
                    .map(move |start| Self::new(start, tile.min(len - start)))
            }

            /// True when the tile is shorter than `M::TILE`.
            pub fn is_partial(&self) -> bool {
                self.size < M::TILE
            }
        }

        impl<I, M> Deref for $Name<I, M> {
            type Target = I;

            fn deref(&self) -> &I {
                &self.index
            }
        }

        impl<I: Clone, M> Clone for $Name<I, M> {
            fn clone(&self) -> Self {
                Self::new(self.index.clone(), self.size.clone())
            }
        }

        impl<I: Copy, M> Copy for $Name<I, M> {}

        impl<I: PartialEq, M> PartialEq for $Name<I, M> {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.size == other.size
            }
        }

        impl<I: Eq, M> Eq for $Name<I, M> {}

        impl<I: Hash, M> Hash for $Name<I, M> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
                self.size.hash(state);
            }
        }

        impl<I: fmt::Debug, M> fmt::Debug for $Name<I, M> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($Name))
                    .field("index", &self.index)
                    .field("size", &self.size)
                    .finish()
            }
        }
    };
}

axis_index!(
    /// A row position (and the number of rows in play) of matrix type `M`.
    RowIndex
);

axis_index!(
    /// A column position (and the number of columns in play) of matrix
    /// type `M`.
    ColIndex
);

impl<I, M> RowIndex<I, M> {
    pub fn to_col(self) -> ColIndex<I, M> {
        ColIndex::new(self.index, self.size)
    }
}

impl<I, M> ColIndex<I, M> {
    pub fn to_row(self) -> RowIndex<I, M> {
        RowIndex::new(self.index, self.size)
    }
}

/// The column index with the same position and extent as `r`.
pub fn to_col_index<I, M>(r: RowIndex<I, M>) -> ColIndex<I, M> {
    r.to_col()
}

/// The row index with the same position and extent as `c`.
pub fn to_row_index<I, M>(c: ColIndex<I, M>) -> RowIndex<I, M> {
    c.to_row()
}
