use rand::Rng;
use termpool::comparator::FixedWidth;
use termpool::prelude::*;
use termpool::{Unsigned, select_indices, sort_indices_by};

#[test]
fn test_basic_sort_strings() {
    let input = vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
        "date".to_string(),
    ];

    let indices = sort_indices(&input);

    let sorted: Vec<&String> = indices.iter().map(|&i| &input[i]).collect();
    assert_eq!(sorted, vec!["apple", "banana", "cherry", "date"]);
}

#[test]
fn test_long_common_prefix() {
    // Generate strings with long prefix
    let prefix = "a".repeat(100);
    let input: Vec<String> = (0..300)
        .map(|i| format!("{}{}", prefix, (b'a' + (i % 26) as u8) as char))
        .collect();

    let indices = sort_indices(&input);
    let sorted: Vec<&String> = indices.iter().map(|&i| &input[i]).collect();

    let mut expected: Vec<&String> = input.iter().collect();
    expected.sort();
    assert_eq!(sorted, expected);
}

#[test]
fn test_prefix_sorts_before_extension() {
    // Keys differing only in length around the common prefix window.
    let base = vec![7u8; 40];
    let input: Vec<Vec<u8>> = (0..=40).rev().map(|n| base[..n].to_vec()).collect();

    let indices = sort_indices(&input);

    let actual: Vec<usize> = indices.iter().map(|&i| input[i].len()).collect();
    assert_eq!(actual, (0..=40).collect::<Vec<_>>());
}

#[test]
fn test_high_bytes_are_unsigned() {
    let input = vec![vec![0xffu8], vec![0x00], vec![0x80], vec![0x7f], vec![]];

    let indices = sort_indices(&input);

    assert_eq!(indices, vec![4, 1, 3, 2, 0]);
}

#[test]
fn test_fuzz_random() {
    let mut rng = rand::rng();
    let mut input: Vec<Vec<u8>> = Vec::new();

    for _ in 0..10_000 {
        let len = rng.random_range(0..50);
        let mut row = vec![0u8; len];
        rng.fill(&mut row[..]);
        input.push(row);
    }

    let indices = sort_indices(&input);

    let mut expected = input.clone();
    expected.sort();

    let actual: Vec<Vec<u8>> = indices.iter().map(|&i| input[i].clone()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_fuzz_random_mut() {
    let mut rng = rand::rng();

    for _ in 0..2_000 {
        // Create random input
        let count = rng.random_range(0..20);
        let mut input: Vec<Vec<u8>> = (0..count)
            .map(|_| {
                let inner_len = rng.random_range(0..50);
                let mut inner = vec![0u8; inner_len];
                rng.fill(&mut inner[..]);
                inner
            })
            .collect();

        let mut expected = input.clone();
        expected.sort();

        sort_keys(&mut input);
        assert_eq!(input, expected);
    }
}

#[test]
fn test_fuzz_random_mut_large() {
    let mut rng = rand::rng();

    // larger sorts go through the radix passes
    for _ in 0..50 {
        let count = rng.random_range(100..1000);
        let mut input: Vec<Vec<u8>> = (0..count)
            .map(|_| {
                let inner_len = rng.random_range(0..100);
                let mut inner = vec![0u8; inner_len];
                // small alphabet so buckets recurse
                inner.iter_mut().for_each(|b| *b = rng.random_range(b'a'..b'e'));
                inner
            })
            .collect();

        let mut expected = input.clone();
        expected.sort();

        sort_keys(&mut input);
        assert_eq!(input, expected);
    }
}

#[test]
fn test_fuzz_edge_cases_mut() {
    // 1. All empty
    let mut input = vec![vec![]; 500];
    let expected = input.clone();
    sort_keys(&mut input);
    assert_eq!(input, expected);

    // 2. All same
    let mut input = vec![vec![1, 2, 3]; 500];
    let expected = input.clone();
    sort_keys(&mut input);
    assert_eq!(input, expected);

    // 3. Reversed
    let mut input: Vec<Vec<u8>> = (0..500).map(|i| vec![(i / 256) as u8, i as u8]).rev().collect();
    let mut expected = input.clone();
    expected.sort();
    sort_keys(&mut input);
    assert_eq!(input, expected);

    // 4. Sorted
    let mut input: Vec<Vec<u8>> = (0..500).map(|i| vec![(i / 256) as u8, i as u8]).collect();
    let expected = input.clone();
    sort_keys(&mut input);
    assert_eq!(input, expected);
}

#[test]
fn test_sort_string_bytes() {
    let input = "banana";
    let indices = sort_indices(input);

    // 'a' at 1, 3, 5. 'b' at 0. 'n' at 2, 4.
    let sorted_bytes: Vec<u8> = indices.iter().map(|&i| input.as_bytes()[i]).collect();
    assert_eq!(sorted_bytes, b"aaabnn".to_vec());
}

#[test]
fn test_sort_owned_string_bytes() {
    let input = String::from("cab");
    // byte offsets of 'a', 'b', 'c'
    assert_eq!(sort_indices(&input), vec![1, 2, 0]);

    let empty = String::new();
    assert!(sort_indices(&empty).is_empty());

    // multi-byte chars are ordered byte by byte: 'é' is [0xc3, 0xa9]
    let accented = String::from("é!");
    assert_eq!(sort_indices(&accented), vec![2, 1, 0]);
    assert_eq!(stable_sort_indices("abab"), vec![0, 2, 1, 3]);
}

#[test]
fn test_vec_deque() {
    use std::collections::VecDeque;
    let input: VecDeque<String> = VecDeque::from(vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
    ]);

    let indices = sort_indices(&input);

    let sorted: Vec<&String> = indices.iter().map(|&i| &input[i]).collect();
    assert_eq!(sorted, vec!["apple", "banana", "cherry"]);
}

#[test]
fn test_empty() {
    let input: Vec<String> = vec![];
    assert!(sort_indices(&input).is_empty());
    assert!(stable_sort_indices(&input).is_empty());
    assert!(select_indices(&input, 0).is_err());
}

#[test]
fn test_mutable_sort() {
    let mut data = vec![
        "banana".to_string(),
        "apple".to_string(),
        "cherry".to_string(),
    ];
    sort_keys(&mut data);
    assert_eq!(data, vec!["apple", "banana", "cherry"]);
}

#[test]
fn test_stable_sort_keeps_index_order() {
    let mut rng = rand::rng();
    let input: Vec<Vec<u8>> = (0..5_000)
        .map(|_| vec![rng.random_range(0..8u8)])
        .collect();

    let indices = stable_sort_indices(&input);

    for pair in indices.windows(2) {
        let (a, b) = (&input[pair[0]], &input[pair[1]]);
        assert!(a < b || (a == b && pair[0] < pair[1]));
    }
}

#[test]
fn test_sort_by_fixed_width() {
    let mut rng = rand::rng();
    let values: Vec<u64> = (0..2_000).map(|_| rng.random()).collect();
    let keys: Vec<[u8; 8]> = values.iter().map(|v| v.to_be_bytes()).collect();

    let indices = sort_indices_by(&keys, &FixedWidth::<8>);

    let actual: Vec<u64> = indices.iter().map(|&i| values[i]).collect();
    let mut expected = values.clone();
    expected.sort_unstable();
    assert_eq!(actual, expected);

    // the generic comparator agrees on big-endian keys
    assert_eq!(
        sort_indices_by(&keys, &Unsigned)
            .iter()
            .map(|&i| values[i])
            .collect::<Vec<_>>(),
        expected
    );
}

#[test]
fn test_select_every_rank() {
    let mut rng = rand::rng();
    let input: Vec<Vec<u8>> = (0..300)
        .map(|_| {
            let len = rng.random_range(0..6);
            (0..len).map(|_| rng.random_range(0..4u8)).collect()
        })
        .collect();
    let mut expected = input.clone();
    expected.sort();

    for k in 0..input.len() {
        let perm = select_indices(&input, k).unwrap();
        let kth = &input[perm[k]];
        assert_eq!(kth, &expected[k]);
        assert!(perm[..k].iter().all(|&i| &input[i] <= kth));
        assert!(perm[k + 1..].iter().all(|&i| &input[i] >= kth));
    }
}
