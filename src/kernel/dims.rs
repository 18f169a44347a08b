//! Launch dimension requirements and how they become a concrete grid.

use std::fmt;

use crate::device::{DeviceLimits, Dim3, Grid};
use crate::error::LaunchError;

/// Hardware requirements of a device statement tree.
///
/// `threads`/`blocks` are what the tree would like (one unit per index);
/// `min_threads`/`min_blocks` are what direct-mapped statements cannot do
/// without. A zero component carries no requirement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchDims {
    pub blocks: Dim3,
    pub min_blocks: Dim3,
    pub threads: Dim3,
    pub min_threads: Dim3,
}

impl LaunchDims {
    /// Merge two requirements. Statements share a dimension's capacity, so
    /// the merge is a pointwise maximum, never a sum.
    pub fn max(self, other: Self) -> Self {
        Self {
            blocks: self.blocks.max(other.blocks),
            min_blocks: self.min_blocks.max(other.min_blocks),
            threads: self.threads.max(other.threads),
            min_threads: self.min_threads.max(other.min_threads),
        }
    }

    /// Fit the requirements into `limits`, producing the launch grid.
    ///
    /// Blocks above the grid limit are clamped (stride loops absorb the
    /// remainder) unless a direct mapping needs them. Threads are halved
    /// along the largest dimension that is still above its minimum until
    /// the block fits.
    pub fn fit(&self, limits: &DeviceLimits) -> Result<Grid, LaunchError> {
        let mut blocks = self.blocks.max(self.min_blocks).at_least_one();
        for dim in 0..3 {
            let limit = limits.max_grid_dim[dim];
            if self.min_blocks.get(dim) > limit {
                return Err(LaunchError::GridTooLarge {
                    dim,
                    requested: self.min_blocks.get(dim) as u64,
                    limit: limit as u64,
                });
            }
            blocks.set(dim, blocks.get(dim).min(limit));
        }

        let min = self.min_threads.at_least_one();
        let mut threads = self.threads.max(self.min_threads).at_least_one();
        for dim in 0..3 {
            let limit = limits.max_block_dim[dim];
            if min.get(dim) > limit {
                return Err(LaunchError::BlockTooLarge {
                    requested: min.get(dim) as u64,
                    limit: limit as u64,
                });
            }
            threads.set(dim, threads.get(dim).min(limit));
        }

        let max_threads = limits.max_threads_per_block as u64;
        if min.product() > max_threads {
            return Err(LaunchError::BlockTooLarge {
                requested: min.product(),
                limit: max_threads,
            });
        }

        let wanted = threads;
        while threads.product() > max_threads {
            let Some(dim) = (0..3)
                .filter(|&d| threads.get(d) > min.get(d))
                .max_by_key(|&d| threads.get(d))
            else {
                break;
            };
            threads.set(dim, (threads.get(dim) / 2).max(min.get(dim)));
        }
        if threads != wanted {
            tracing::warn!(%wanted, fitted = %threads, "threads shrunk to fit the block limit");
        }

        Ok(Grid::new(blocks, threads))
    }
}

impl fmt::Display for LaunchDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks={} min_blocks={} threads={} min_threads={}",
            self.blocks, self.min_blocks, self.threads, self.min_threads
        )
    }
}
