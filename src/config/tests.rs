use super::*;
use tempfile::tempdir;

fn load_str(content: &str) -> Result<LaunchConfig, LaunchError> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("launch.toml");
    std::fs::write(&path, content).unwrap();
    LaunchConfig::load(&path)
}

#[test]
fn test_full_config() {
    let config = load_str(
        r#"
[launch]
place = "device"
teams = [17, 16]
threads = [16, 16]
lanes = 4
shared_words = 512

[device]
max_threads_per_block = 512
"#,
    )
    .unwrap();
    assert_eq!(config.place, ExecPlace::Device);
    assert_eq!(config.resources.teams.value, [17, 16, 1]);
    assert_eq!(config.resources.threads.value, [16, 16, 1]);
    assert_eq!(config.resources.lanes.value, 4);
    assert_eq!(config.resources.shared_words, 512);
    assert_eq!(config.device.max_threads_per_block, 512);
    // Unspecified limits keep their defaults.
    assert_eq!(config.device.max_block_dim, [1024, 1024, 64]);
}

#[test]
fn test_empty_config_is_default() {
    assert_eq!(load_str("").unwrap(), LaunchConfig::default());
}

#[test]
fn test_unknown_place() {
    let err = load_str("[launch]\nplace = \"fpga\"\n").unwrap_err();
    assert_eq!(err, LaunchError::UnknownPlace("fpga".into()));
}

#[test]
fn test_zero_team_extent() {
    let err = load_str("[launch]\nteams = [4, 0]\n").unwrap_err();
    assert!(matches!(err, LaunchError::InvalidResources(_)));
}

#[test]
fn test_too_many_extents() {
    let err = LaunchConfig::parse("[launch]\nthreads = [1, 2, 3, 4]\n").unwrap_err();
    assert_eq!(
        err,
        LaunchError::Config("'threads' needs 1 to 3 extents, got 4".into())
    );
}

#[test]
fn test_unknown_key_rejected() {
    let err = LaunchConfig::parse("[launch]\nblocks = [1]\n").unwrap_err();
    assert!(matches!(err, LaunchError::Config(_)));
}

#[test]
fn test_zero_device_limit_rejected() {
    let err = LaunchConfig::parse("[device]\nmax_grid_dim = [0, 1, 1]\n").unwrap_err();
    assert!(matches!(err, LaunchError::Config(_)));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = LaunchConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, LaunchError::Config(msg) if msg.starts_with("cannot read")));
}
