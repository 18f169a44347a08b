use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use loopnest::policy::{BlockXLoop, BlockXyzLoop, LoopExec, ThreadXLoop, ThreadXyzLoop};
use loopnest::teams::{DeviceLaunch, LaunchPolicy, LoopPolicy, SeqLaunch};
use loopnest::{
    launch, launch_with, team_loop, team_loop2, ExecPlace, LaunchConfig, LaunchError,
    RangeSegment, Resources, Teams, Threads,
};

type Launch = LaunchPolicy<SeqLaunch, DeviceLaunch>;
type Rows = LoopPolicy<LoopExec, BlockXLoop>;
type Cols = LoopPolicy<LoopExec, ThreadXLoop>;
type Teams2 = LoopPolicy<LoopExec, BlockXyzLoop>;
type Threads2 = LoopPolicy<LoopExec, ThreadXyzLoop>;

fn weighted_sum(place: ExecPlace, resources: &Resources) -> i64 {
    let sum = AtomicI64::new(0);
    launch::<Launch, _>(place, resources, |ctx| {
        team_loop::<Rows, _, _>(ctx, &RangeSegment::new(0, 37), |r| {
            team_loop::<Cols, _, _>(ctx, &RangeSegment::new(0, 101), |c| {
                sum.fetch_add(r * 1000 + c, Ordering::Relaxed);
            });
        });
    })
    .unwrap();
    sum.into_inner()
}

#[test]
fn test_four_teams_of_thirty_two() {
    let resources = Resources::new(Teams::new(4), Threads::new(32));
    assert_eq!(resources.teams.value, [4, 1, 1]);
    assert_eq!(resources.threads.value, [32, 1, 1]);

    let expected: i64 = (0..37)
        .flat_map(|r| (0..101).map(move |c| r * 1000 + c))
        .sum();
    assert_eq!(weighted_sum(ExecPlace::Host, &resources), expected);
    assert_eq!(weighted_sum(ExecPlace::Device, &resources), expected);
}

#[test]
fn test_two_dimensional_teams_and_threads() {
    let resources = Resources::new(Teams::xy(3, 2), Threads::xy(8, 4));
    let run = |place| {
        let hits = AtomicUsize::new(0);
        let sum = AtomicI64::new(0);
        launch::<Launch, _>(place, &resources, |ctx| {
            team_loop2::<Teams2, _, _, _>(
                ctx,
                &RangeSegment::new(0, 5),
                &RangeSegment::new(0, 7),
                |bx, by| {
                    team_loop2::<Threads2, _, _, _>(
                        ctx,
                        &RangeSegment::new(0, 9),
                        &RangeSegment::new(0, 6),
                        |tx, ty| {
                            hits.fetch_add(1, Ordering::Relaxed);
                            sum.fetch_add(bx * 1000 + by * 100 + tx * 10 + ty, Ordering::Relaxed);
                        },
                    );
                },
            );
        })
        .unwrap();
        (hits.into_inner(), sum.into_inner())
    };
    let host = run(ExecPlace::Host);
    assert_eq!(host.0, 5 * 7 * 9 * 6);
    assert_eq!(run(ExecPlace::Device), host);
}

#[test]
fn test_place_from_command_line_values() {
    assert_eq!("1".parse::<ExecPlace>(), Ok(ExecPlace::Device));
    assert_eq!(ExecPlace::try_from(0), Ok(ExecPlace::Host));
    assert!(matches!(
        ExecPlace::try_from(2),
        Err(LaunchError::UnknownPlace(p)) if p == "2"
    ));
}

#[test]
fn test_launch_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launch.toml");
    std::fs::write(
        &path,
        "[launch]\nplace = \"device\"\nteams = [4]\nthreads = [32]\n\n[device]\nmax_threads_per_block = 16\n",
    )
    .unwrap();
    let config = LaunchConfig::load(&path).unwrap();

    let err = launch_with::<Launch, _, _>(&config.device, &(), config.place, &config.resources, |_| {})
        .unwrap_err();
    assert_eq!(
        err,
        LaunchError::BlockTooLarge {
            requested: 32,
            limit: 16
        }
    );
    assert_eq!(weighted_sum(ExecPlace::Host, &config.resources), weighted_sum(ExecPlace::Device, &config.resources));
}
