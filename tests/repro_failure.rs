use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use termpool::prelude::*;

#[test]
fn test_zeroed_entries() {
    let mut rng = StdRng::seed_from_u64(42);

    for _iter in 0..10 {
        let len = rng.random_range(2000..5000);
        let mut input: Vec<Vec<u8>> = Vec::new();

        for _ in 0..len {
            let row_len = rng.random_range(0..4); // Keep short to trigger [0] vs []
            let mut row = vec![0u8; row_len];
            rng.fill(&mut row[..]);
            input.push(row);
        }

        let indices = sort_indices(&input);

        let mut expected = input.clone();
        expected.sort();

        let actual: Vec<Vec<u8>> = indices.iter().map(|&i| input[i].clone()).collect();

        if actual != expected {
            // Find first mismatch
            for (i, (a, b)) in actual.iter().zip(expected.iter()).enumerate() {
                if a != b {
                    panic!("Mismatch at index {}: Got {:?}, Expected {:?}", i, a, b);
                }
            }
            panic!(
                "Lengths differ? Actual: {}, Expected: {}",
                actual.len(),
                expected.len()
            );
        }
    }
}

#[test]
fn test_zero_bytes_are_distinct_terms() {
    // [], [0] and [0, 0] are three different terms; a zero byte is not an end marker.
    let mut hash = BytesRefHash::new(ByteBlockPool::default());
    let terms: [&[u8]; 4] = [&[0, 0], &[], &[0], &[0, 0]];

    let ids: Vec<i32> = terms.iter().map(|t| hash.add(t).unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2, -1]);

    let sorted = hash.sort().unwrap();
    assert_eq!(sorted.to_vec(), vec![1, 2, 0]);
}

#[test]
fn test_zeroed_terms_through_hash() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut hash = BytesRefHash::new(ByteBlockPool::default());
    let mut distinct = std::collections::BTreeSet::new();

    for _ in 0..4000 {
        let row_len = rng.random_range(0..4);
        let row: Vec<u8> = (0..row_len).map(|_| rng.random_range(0..3u8)).collect();
        hash.add(&row).unwrap();
        distinct.insert(row);
    }

    let sorted = hash.sort().unwrap();
    let actual: Vec<Vec<u8>> = sorted.iter().map(|t| t.to_vec()).collect();
    let expected: Vec<Vec<u8>> = distinct.into_iter().collect();
    assert_eq!(actual, expected);
}
