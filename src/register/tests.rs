use super::*;
use proptest::prelude::*;

type F64x4 = Register<f64, 4, Simd256>;
type I32x4 = Register<i32, 4, Simd128>;
type Warp = Register<f32, 32, CudaWarp>;
type Row4 = RegisterMatrix<i32, RowMajor, 4, Simd128>;
type Col4 = RegisterMatrix<i32, ColMajor, 4, Simd128>;
type Mat2 = RegisterMatrix<f64, RowMajor, 2, Simd128>;

// ─── Register ─────────────────────────────────────────────────────

#[test]
fn test_native_lane_counts() {
    assert_eq!(lanes::<f64, Simd256>(), 4);
    assert_eq!(lanes::<f32, Simd256>(), 8);
    assert_eq!(lanes::<i32, Simd128>(), 4);
    assert_eq!(lanes::<u64, Simd512>(), 8);
    assert_eq!(lanes::<f64, ScalarRegister>(), 1);
    assert_eq!(lanes::<f32, CudaWarp>(), 32);
    assert_eq!(lanes::<f64, CudaWarp<4>>(), 16);
    assert_eq!(Warp::LANES, 32);
}

#[test]
fn test_broadcast_get_set() {
    let mut r = I32x4::broadcast(7);
    r.set(2, -1);
    assert_eq!(r.to_array(), [7, 7, -1, 7]);
    assert_eq!(r.get(2), -1);
    assert_eq!(format!("{r:?}"), "simd128[7, 7, -1, 7]");
}

#[test]
fn test_partial_load_zero_fills() {
    let src = [1, 2, 3];
    assert_eq!(I32x4::load_partial(&src, 3).to_array(), [1, 2, 3, 0]);

    let strided = [10, 0, 11, 0, 12, 0, 13];
    assert_eq!(I32x4::load_strided(&strided, 2).to_array(), [10, 11, 12, 13]);
    assert_eq!(
        I32x4::load_partial_strided(&strided, 2, 2).to_array(),
        [10, 11, 0, 0]
    );
}

#[test]
fn test_stores() {
    let r = I32x4::new([1, 2, 3, 4]);
    let mut dst = [0; 8];
    r.store_strided(&mut dst, 2);
    assert_eq!(dst, [1, 0, 2, 0, 3, 0, 4, 0]);

    let mut dst = [9; 4];
    r.store_partial(&mut dst, 2);
    assert_eq!(dst, [1, 2, 9, 9]);

    let mut dst = [0; 4];
    r.store_packed(&mut dst);
    assert_eq!(I32x4::load_packed(&dst), r);
}

#[test]
fn test_lane_arithmetic() {
    let a = F64x4::new([1.0, 2.0, 3.0, 4.0]);
    let b = F64x4::broadcast(2.0);
    assert_eq!((a + b).to_array(), [3.0, 4.0, 5.0, 6.0]);
    assert_eq!((a - b).to_array(), [-1.0, 0.0, 1.0, 2.0]);
    assert_eq!((a * b).to_array(), [2.0, 4.0, 6.0, 8.0]);
    assert_eq!((a / b).to_array(), [0.5, 1.0, 1.5, 2.0]);
    assert_eq!(a.fma(b, F64x4::broadcast(1.0)).to_array(), [3.0, 5.0, 7.0, 9.0]);
    assert_eq!(a.min(b).to_array(), [1.0, 2.0, 2.0, 2.0]);
    assert_eq!(a.max(b).to_array(), [2.0, 2.0, 3.0, 4.0]);
    assert_eq!(a.scale(0.5).to_array(), [0.5, 1.0, 1.5, 2.0]);
}

#[test]
fn test_reductions() {
    let a = I32x4::new([4, -2, 9, 1]);
    assert_eq!(a.sum(), 12);
    assert_eq!(a.min_lane(), -2);
    assert_eq!(a.max_lane(), 9);
    assert_eq!(a.dot(&I32x4::new([1, 1, 0, 2])), 4);
}

#[test]
fn test_warp_register_is_a_value_type() {
    let a = Warp::from_fn(|i| i as f32);
    assert_eq!(a.sum(), (0..32).sum::<i32>() as f32);
    assert_eq!(a.as_bytes().len(), 32 * 4);
}

// ─── RegisterMatrix ───────────────────────────────────────────────

#[test]
fn test_layouts_agree_on_elements() {
    let f = |r: usize, c: usize| (r * 10 + c) as i32;
    let row = Row4::from_fn(f);
    let col = Col4::from_fn(f);
    for r in 0..4 {
        for c in 0..4 {
            assert_eq!(row.get(r, c), col.get(r, c));
        }
    }
    // Row-major stores rows in registers, column-major stores columns.
    assert_eq!(row.registers()[1].to_array(), [10, 11, 12, 13]);
    assert_eq!(col.registers()[1].to_array(), [1, 11, 21, 31]);
    assert_eq!(row.row(2), col.row(2));
    assert_eq!(row.col(3), col.col(3));
}

#[test]
fn test_matvec_matches_across_layouts() {
    let f = |r: usize, c: usize| r as i32 - 2 * c as i32;
    let x = I32x4::new([1, 2, 3, 4]);
    let expected: Vec<i32> = (0..4)
        .map(|r| (0..4).map(|c| f(r, c) * x.get(c)).sum())
        .collect();
    assert_eq!(Row4::from_fn(f).matvec(&x).to_array().to_vec(), expected);
    assert_eq!(Col4::from_fn(f).matvec(&x).to_array().to_vec(), expected);
}

#[test]
fn test_matmul_known_product() {
    let a = Mat2::from_fn(|r, c| (r * 2 + c + 1) as f64);
    let b = Mat2::from_fn(|r, c| (r * 2 + c + 5) as f64);
    let p = a.matmul(&b);
    assert_eq!(p.row(0).to_array(), [19.0, 22.0]);
    assert_eq!(p.row(1).to_array(), [43.0, 50.0]);
    assert_eq!(a.matmul(&Mat2::identity()), a);
}

#[test]
fn test_transpose_add_sub_scale() {
    let a = Col4::from_fn(|r, c| (r * 4 + c) as i32);
    let t = a.transpose();
    assert_eq!(t.get(1, 3), a.get(3, 1));
    assert_eq!(t.transpose(), a);
    assert_eq!((a + a) - a, a);
    assert_eq!(a.scale(3).get(2, 2), 30);
    assert_eq!(Col4::broadcast(1) - Col4::zero(), Col4::broadcast(1));
}

#[test]
fn test_partial_tile_load_and_store() {
    // 3 × 5 row-major source.
    let src: Vec<i32> = (0..15).collect();
    let tile = Row4::load(&src, 5, RowIndex::new(0, 3), ColIndex::new(1, 4));
    assert_eq!(tile.row(0).to_array(), [1, 2, 3, 4]);
    assert_eq!(tile.row(2).to_array(), [11, 12, 13, 14]);
    assert_eq!(tile.row(3), I32x4::zero());

    let mut dst = vec![0; 15];
    tile.store(&mut dst, 5, RowIndex::new(0, 3), ColIndex::new(1, 4));
    for r in 0..3 {
        assert_eq!(dst[r * 5], 0);
        assert_eq!(&dst[r * 5 + 1..r * 5 + 5], &src[r * 5 + 1..r * 5 + 5]);
    }
}

// ─── Indices ──────────────────────────────────────────────────────

#[test]
fn test_index_conversion_keeps_numbers() {
    let r = RowIndex::<usize, Row4>::new(8, 3);
    let c = to_col_index(r);
    assert_eq!((*c, c.size()), (8, 3));
    assert_eq!(to_row_index(c), r);
    assert_eq!(format!("{c:?}"), "ColIndex { index: 8, size: 3 }");
}

#[test]
fn test_tiles_end_with_one_partial() {
    let tiles: Vec<_> = RowIndex::<usize, Row4>::tiles(10)
        .map(|t| (t.index(), t.size(), t.is_partial()))
        .collect();
    assert_eq!(tiles, vec![(0, 4, false), (4, 4, false), (8, 2, true)]);
    assert_eq!(ColIndex::<usize, F64x4>::tiles(8).count(), 2);
    assert_eq!(ColIndex::<usize, F64x4>::tiles(0).count(), 0);
}

proptest! {
    #[test]
    fn prop_row_col_round_trip(index in 0i64..1_000_000, size in 0i64..1_000_000) {
        let r = RowIndex::<i64, Col4>::new(index, size);
        prop_assert_eq!(to_row_index(to_col_index(r)), r);
        let c = ColIndex::<i64, Col4>::new(index, size);
        prop_assert_eq!(to_col_index(to_row_index(c)), c);
    }

    #[test]
    fn prop_tiles_cover_exactly_once(len in 0usize..500) {
        let mut next = 0;
        for tile in RowIndex::<usize, Row4>::tiles(len) {
            prop_assert_eq!(tile.index(), next);
            prop_assert!(tile.size() >= 1 && tile.size() <= 4);
            next += tile.size();
        }
        prop_assert_eq!(next, len);
    }

    #[test]
    fn prop_layouts_matvec_agree(values in proptest::collection::vec(-100i32..100, 20)) {
        let row = Row4::from_fn(|r, c| values[r * 4 + c]);
        let col = Col4::from_fn(|r, c| values[r * 4 + c]);
        let x = I32x4::load_packed(&values[16..]);
        prop_assert_eq!(row.matvec(&x), col.matvec(&x));
    }
}
