pub mod dims;
pub mod limits;
pub mod transpose;

use std::path::Path;
use std::process;

use loopnest::{ExecPlace, LaunchConfig};

/// Load a launch config, or the defaults without one. Exits on error.
pub fn load_config(path: Option<&Path>) -> LaunchConfig {
    let Some(path) = path else {
        return LaunchConfig::default();
    };
    match LaunchConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Parse an execution place given on the command line. Exits on error.
pub fn parse_place(place: &str) -> ExecPlace {
    match place.parse() {
        Ok(place) => place,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
