//! Adapter discovery through wgpu.
//!
//! The emulated device sizes its grids from real compute limits when a GPU
//! adapter is present: workgroup invocations map to threads per block,
//! workgroup sizes to block dimensions, and workgroups per dimension to
//! grid dimensions.

use super::DeviceLimits;

/// A discovered adapter and the limits derived from it.
#[derive(Clone, Debug)]
pub struct AdapterLimits {
    pub name: String,
    pub backend: String,
    pub limits: DeviceLimits,
}

/// Map wgpu compute limits onto launch limits.
/// Warp width is not exposed uniformly across backends and keeps its default.
pub fn limits_from_wgpu(limits: &wgpu::Limits) -> DeviceLimits {
    let grid = limits.max_compute_workgroups_per_dimension;
    DeviceLimits {
        max_threads_per_block: limits.max_compute_invocations_per_workgroup,
        max_block_dim: [
            limits.max_compute_workgroup_size_x,
            limits.max_compute_workgroup_size_y,
            limits.max_compute_workgroup_size_z,
        ],
        max_grid_dim: [grid, grid, grid],
        ..DeviceLimits::default()
    }
}

/// Ask wgpu for a high-performance adapter.
/// Returns None if no GPU adapter is available.
pub fn probe_adapter() -> Option<AdapterLimits> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    let info = adapter.get_info();
    Some(AdapterLimits {
        name: info.name,
        backend: format!("{:?}", info.backend),
        limits: limits_from_wgpu(&adapter.limits()),
    })
}
