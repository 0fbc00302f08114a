use super::*;
use crate::define_idx;

use quickcheck_macros::quickcheck;

define_idx!(TestId);

#[test]
fn push_and_index() {
    let mut v: IndexVec<TestId, &'static str> = IndexVec::new();
    let a = v.push("a");
    let b = v.push("b");
    assert_eq!(v[a], "a");
    assert_eq!(v[b], "b");
    assert_eq!(v.len(), 2);
}

#[test]
fn iter_enumerated_matches_push_order() {
    let mut v: IndexVec<TestId, i32> = IndexVec::new();
    v.push(10);
    v.push(20);
    v.push(30);
    let collected: Vec<_> = v.iter_enumerated().map(|(i, x)| (i.index(), *x)).collect();
    assert_eq!(collected, vec![(0, 10), (1, 20), (2, 30)]);
}

#[test]
fn get_out_of_bounds_is_none() {
    let v: IndexVec<TestId, i32> = IndexVec::new();
    assert_eq!(v.get(TestId(0)), None);
}

#[quickcheck]
fn prop_push_returns_index_of_value(values: Vec<i32>) -> bool {
    let mut v: IndexVec<TestId, i32> = IndexVec::new();
    let indices: Vec<TestId> = values.iter().map(|&x| v.push(x)).collect();
    indices.iter().zip(&values).all(|(&i, &x)| v[i] == x)
}

#[quickcheck]
fn prop_indices_cover_the_whole_vec(values: Vec<u8>) -> bool {
    let mut v: IndexVec<TestId, u8> = IndexVec::new();
    for x in &values {
        v.push(*x);
    }
    v.indices().count() == values.len() && v.indices().all(|i| v.get(i).is_some())
}
