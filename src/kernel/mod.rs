//! Nested-loop kernels: statement trees, their executors and launch
//! dimension calculation.
//!
//! ```text
//! policy (types) ─┬→ HostStatement   → nested CPU loops (seq / rayon)
//!                 └→ DeviceStatement → LaunchDims → Grid → SIMT lanes
//! ```
//!
//! A statement/policy pair without an executor for the requested context
//! does not compile: `Direct<ThreadIdx, 0>` has no host executor and
//! `ParExec` has no device executor.

pub mod data;
pub mod dims;
pub mod host;
pub mod simt;
pub mod statement;


pub use data::{BodyAt, Indices, LoopData, MAX_PARAMS};
pub use dims::LaunchDims;
pub use host::{forall, forall_segment, forall_with_hook, HostStatement};
pub use simt::{forall_device, forall_device_with, launch_dims, Claim, DeviceStatement};
pub use statement::{Describe, For, ForICount, KernelPolicy, Lambda};
