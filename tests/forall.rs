use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use loopnest::policy::{
    BlockXDirect, BlockYLoop, ParExec, SeqExec, ThreadXLoop, ThreadYDirect, ThreadYLoop,
};
use loopnest::{
    forall, forall_device, forall_device_with, launch_dims, DeviceLimits, Describe, For,
    ForICount, Indices, Lambda, ListSegment, RangeSegment, RangeStrideSegment,
};
use proptest::prelude::*;

#[test]
fn test_sequential_append_yields_zero_to_nine() {
    type Pol = (For<0, SeqExec, (Lambda<0>,)>,);
    let seq = Mutex::new(Vec::new());
    forall::<Pol, _, _>(
        &(RangeSegment::new(0, 10),),
        &(|ix: &Indices| seq.lock().unwrap().push(ix.get(0)),),
    );
    assert_eq!(seq.into_inner().unwrap(), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

type Record = (i64, i64, i64, usize);

fn recorder(out: &Mutex<Vec<Record>>) -> impl Fn(&Indices) + Sync + '_ {
    move |ix: &Indices| {
        out.lock()
            .unwrap()
            .push((ix.get(0), ix.get(1), ix.get(2), ix.param(0)))
    }
}

#[test]
fn test_mixed_segments_host_matches_device() {
    // A strided row segment, an explicit column list and a counted batch.
    let segments = (
        ListSegment::new(vec![3, 1, 4, 1, 5]),
        RangeStrideSegment::new(20, 0, -4),
        RangeSegment::new(0, 3),
    );
    let host = Mutex::new(Vec::new());
    let device = Mutex::new(Vec::new());

    type Host = (For<2, SeqExec, (For<1, ParExec, (ForICount<0, 0, SeqExec, (Lambda<0>,)>,)>,)>,);
    type Device =
        (For<2, BlockXDirect, (For<1, ThreadYDirect, (ForICount<0, 0, ThreadXLoop, (Lambda<0>,)>,)>,)>,);

    forall::<Host, _, _>(&segments, &(recorder(&host),));
    forall_device::<Device, _, _>(&segments, &(recorder(&device),)).unwrap();

    let mut host = host.into_inner().unwrap();
    let mut device = device.into_inner().unwrap();
    host.sort_unstable();
    device.sort_unstable();
    assert_eq!(host.len(), 5 * 5 * 3);
    assert_eq!(host, device);
}

#[test]
fn test_describe_and_dims_of_tiled_kernel() {
    type Pol = (
        For<2, BlockXDirect, (
            For<1, BlockYLoop, (
                For<0, ThreadXLoop<64>, (Lambda<0>,)>,
                For<0, ThreadYLoop<4>, (Lambda<1>,)>,
            )>,
        )>,
    );
    let segments = (
        RangeSegment::new(0, 500),
        RangeSegment::new(0, 70_000),
        RangeSegment::new(0, 8),
    );
    let bodies = (|_: &Indices| {}, |_: &Indices| {});
    let dims = launch_dims::<Pol, _, _>(&segments, &bodies);
    insta::assert_snapshot!(
        format!("{}{}\n{}", Pol::describe(), dims, dims.fit(&DeviceLimits::default()).unwrap()),
        @r"
    For<2, block_x_direct>
      For<1, block_y_loop>
        For<0, thread_x_loop<min=64>>
          Lambda<0>
        For<0, thread_y_loop<min=4>>
          Lambda<1>
    blocks=(8,70000,0) min_blocks=(8,1,0) threads=(500,500,0) min_threads=(64,4,0)
    blocks=(8,65535,1) threads=(64,15,1)
    "
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_strided_policy_covers_every_offset_once(len in 0i64..300, max_threads in 1u32..64) {
        type Pol = (For<0, ThreadXLoop, (Lambda<0>,)>,);
        let limits = DeviceLimits { max_threads_per_block: max_threads, ..DeviceLimits::default() };
        let hits: Vec<AtomicUsize> = (0..len).map(|_| AtomicUsize::new(0)).collect();
        let grid = forall_device_with::<Pol, _, _, _>(
            &limits,
            &(),
            &(RangeSegment::new(0, len),),
            &(|ix: &Indices| {
                hits[ix.get(0) as usize].fetch_add(1, Ordering::Relaxed);
            },),
        )
        .unwrap();
        prop_assert!(grid.threads.x <= max_threads);
        prop_assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }
}
