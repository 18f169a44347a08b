//! Runtime failures of the launch layer.
//!
//! Mismatched statements, missing loop bodies and out-of-range argument ids
//! never reach this type: they fail to compile. What remains are the
//! conditions that depend on runtime values (an execution place read from
//! the command line, a grid that does not fit the device, a bad config).

use thiserror::Error;

use crate::device::Unit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("unknown launch place '{0}'")]
    UnknownPlace(String),

    #[error("invalid resources: {0}")]
    InvalidResources(String),

    #[error("block of {requested} threads exceeds device limit of {limit}")]
    BlockTooLarge { requested: u64, limit: u64 },

    #[error("grid dimension {dim} needs {requested} blocks, device limit is {limit}")]
    GridTooLarge { dim: usize, requested: u64, limit: u64 },

    #[error("{unit} dimension {dim} claimed by '{inner}' is already claimed by enclosing '{outer}'")]
    DimensionConflict {
        unit: Unit,
        dim: usize,
        outer: String,
        inner: String,
    },

    #[error("policy offset {offset} selected, but only {count} policies are available")]
    UnknownPolicy { offset: usize, count: usize },

    #[error("team shared memory exhausted: {requested} words requested, {available} available")]
    SharedMemoryExhausted { requested: usize, available: usize },

    #[error("config: {0}")]
    Config(String),
}
