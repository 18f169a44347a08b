use std::process;

use loopnest::device::probe;
use loopnest::DeviceLimits;

/// Print device limits as TOML, ready to paste into a `[device]` table.
pub fn cmd_limits(probe_adapter: bool) {
    let limits = if probe_adapter {
        match probe::probe_adapter() {
            Some(adapter) => {
                eprintln!("Adapter: {} ({})", adapter.name, adapter.backend);
                adapter.limits
            }
            None => {
                eprintln!("No adapter found, using defaults");
                DeviceLimits::default()
            }
        }
    } else {
        DeviceLimits::default()
    };

    match toml::to_string(&limits) {
        Ok(text) => print!("[device]\n{}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
