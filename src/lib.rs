pub mod config;
pub mod device;
pub mod error;
pub mod index;
pub mod kernel;
pub mod policy;
pub mod register;
pub mod space;
pub mod teams;

// Re-exports: the names most callers need at `loopnest::X`
pub use config::LaunchConfig;
pub use device::{DeviceLimits, Dim3, Grid, Lane};
pub use error::LaunchError;
pub use index::{ListSegment, RangeSegment, RangeStrideSegment, Segment};
pub use kernel::{
    forall, forall_device, forall_device_with, forall_segment, forall_with_hook, launch_dims,
    Describe, For, ForICount, Indices, KernelPolicy, Lambda, LaunchDims,
};
pub use space::{ExecSpace, ExecSpaceHook};
pub use teams::{
    launch, launch_with, team_loop, team_loop2, team_loop3, ExecPlace, LaunchContext, Lanes,
    Resources, Teams, Threads,
};
