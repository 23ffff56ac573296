use proptest::prelude::*;
use std::collections::HashMap;
use termpool::hash::MAX_TERM_LENGTH;
use termpool::pool::BLOCK_SIZE;
use termpool::prelude::*;
use termpool::{DirectTrackingAllocator, HashConfig};

fn new_hash() -> BytesRefHash {
    BytesRefHash::with_config(
        ByteBlockPool::default(),
        HashConfig::default().with_seed(0x5eed),
        Counter::new(),
    )
}

#[test]
fn test_fruit_scenario() {
    let mut hash = new_hash();
    let ids: Vec<i32> = ["banana", "apple", "apple", "cherry"]
        .iter()
        .map(|t| hash.add(t.as_bytes()).unwrap())
        .collect();

    assert_eq!(ids, vec![0, 1, -2, 2]);
    assert_eq!(hash.len(), 3);

    let sorted = hash.sort().unwrap();
    assert_eq!(sorted.ids(), &[1, 0, 2]);
    assert_eq!(sorted.term(0), b"apple");
    assert_eq!(sorted.term(2), b"cherry");
}

#[test]
fn test_find_and_get() {
    let mut hash = new_hash();
    assert_eq!(hash.find(b"missing"), None);

    let id = hash.add(b"present").unwrap();
    assert_eq!(hash.find(b"present"), Some(id));
    assert_eq!(hash.find(b"presen"), None);
    assert_eq!(hash.get(id), b"present");
}

#[test]
#[should_panic]
fn test_get_out_of_range_panics() {
    let mut hash = new_hash();
    hash.add(b"one").unwrap();
    hash.get(1);
}

#[test]
fn test_ids_are_dense_through_growth() {
    let counter = Counter::new();
    let mut hash =
        BytesRefHash::with_config(ByteBlockPool::default(), HashConfig::default().with_seed(1), counter.clone());
    assert_eq!(hash.table_size(), 16);

    for i in 0..10_000u32 {
        let term = format!("term-{i}");
        assert_eq!(hash.add(term.as_bytes()).unwrap(), i as i32);
    }
    assert_eq!(hash.len(), 10_000);
    assert_eq!(hash.table_size(), 32_768);
    assert_eq!(counter.get(), 32_768 * 4);

    for i in (0..10_000u32).step_by(97) {
        let term = format!("term-{i}");
        assert_eq!(hash.find(term.as_bytes()), Some(i as i32));
        assert_eq!(hash.add(term.as_bytes()).unwrap(), -(i as i32) - 1);
        assert_eq!(hash.get(i as i32), term.as_bytes());
    }
}

#[test]
fn test_grows_at_half_occupancy() {
    let mut hash = BytesRefHash::with_config(
        ByteBlockPool::default(),
        HashConfig::default().with_capacity(8).with_seed(3),
        Counter::new(),
    );
    for i in 0..3u8 {
        hash.add(&[i]).unwrap();
    }
    assert_eq!(hash.table_size(), 8);
    hash.add(&[3]).unwrap();
    assert_eq!(hash.table_size(), 16);
}

#[test]
fn test_clear_shrinks_sparse_table() {
    let counter = Counter::new();
    let mut hash =
        BytesRefHash::with_config(ByteBlockPool::default(), HashConfig::default().with_seed(2), counter.clone());
    for i in 0..1_000u32 {
        hash.add(&i.to_be_bytes()).unwrap();
    }
    assert_eq!(hash.table_size(), 2048);

    // full table: no shrink
    hash.clear(true);
    assert_eq!(hash.table_size(), 2048);
    assert!(hash.is_empty());
    assert_eq!(hash.find(&0u32.to_be_bytes()), None);

    // 10 terms in 2048 buckets: halve while size / 5 > 10
    for i in 0..10u32 {
        hash.add(&i.to_be_bytes()).unwrap();
    }
    hash.clear(true);
    assert_eq!(hash.table_size(), 32);
    assert_eq!(counter.get(), 32 * 4);

    // empty: shrinks down to the floor
    hash.clear(true);
    assert_eq!(hash.table_size(), 4);

    assert_eq!(hash.add(b"fresh").unwrap(), 0);
}

#[test]
fn test_clear_keeps_pool_when_asked() {
    let mut hash = new_hash();
    hash.add(b"kept bytes").unwrap();
    let position = hash.pool().position();

    hash.clear(false);
    assert_eq!(hash.pool().position(), position);
    assert_eq!(hash.add(b"kept bytes").unwrap(), 0);

    hash.clear(true);
    assert_eq!(hash.pool().block_count(), 0);
}

#[test]
fn test_finalized_rejects_adds_until_clear() {
    let mut hash = new_hash();
    hash.add(b"a").unwrap();
    hash.add(b"b").unwrap();

    let compacted = hash.compact().unwrap();
    let mut ids = compacted.to_vec();
    ids.sort();
    assert_eq!(ids, vec![0, 1]);

    assert_eq!(hash.add(b"c"), Err(Error::Finalized));
    assert_eq!(hash.find(b"a"), None);
    // reading terms still works
    assert_eq!(hash.get(1), b"b");

    // sorting a compacted hash is allowed
    assert_eq!(hash.sort().unwrap().to_vec(), vec![0, 1]);

    hash.clear(false);
    assert_eq!(hash.add(b"c").unwrap(), 0);
}

#[test]
fn test_close_and_reinit() {
    let counter = Counter::new();
    let mut hash =
        BytesRefHash::with_config(ByteBlockPool::default(), HashConfig::default().with_seed(9), counter.clone());
    hash.add(b"x").unwrap();
    assert_eq!(counter.get(), 16 * 4);

    hash.close();
    assert_eq!(counter.get(), 0);
    assert_eq!(hash.add(b"x"), Err(Error::Closed));
    assert!(matches!(hash.sort(), Err(Error::Closed)));
    assert!(matches!(hash.compact(), Err(Error::Closed)));
    assert_eq!(hash.find(b"x"), None);
    assert_eq!(hash.len(), 0);

    // closing twice is harmless
    hash.close();
    assert_eq!(counter.get(), 0);

    hash.reinit();
    assert!(counter.get() > 0);
    assert_eq!(hash.add(b"x").unwrap(), 0);
}

#[test]
fn test_term_too_long_leaves_state_untouched() {
    let mut hash = new_hash();
    hash.add(b"before").unwrap();
    let position = hash.pool().position();

    let err = hash.add(&vec![1u8; MAX_TERM_LENGTH + 1]).unwrap_err();
    assert!(matches!(err, Error::TermTooLong { .. }));
    assert_eq!(err.category(), "capacity");
    assert_eq!(hash.pool().position(), position);
    assert_eq!(hash.len(), 1);
    assert_eq!(hash.add(b"after").unwrap(), 1);
}

#[test]
fn test_longest_term_fits_in_one_block() {
    let mut hash = new_hash();
    let longest = vec![0x42u8; MAX_TERM_LENGTH];
    hash.add(b"small").unwrap();
    let id = hash.add(&longest).unwrap();

    assert_eq!(hash.byte_start(id) % BLOCK_SIZE, 0);
    assert_eq!(hash.get(id), &longest[..]);
    assert_eq!(hash.add(&longest).unwrap(), -(id + 1));
}

#[test]
fn test_add_by_pool_offset() {
    let mut hash = new_hash();
    let offsets = [0usize, 17, 1 << 20, 17, 5, 0];
    let ids: Vec<i32> = offsets
        .iter()
        .map(|&o| hash.add_by_pool_offset(o).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, -2, 3, -1]);
    assert_eq!(hash.byte_start(2), 1 << 20);

    // growth rehashes on the offsets themselves
    for o in 100..200 {
        hash.add_by_pool_offset(o).unwrap();
    }
    assert_eq!(hash.add_by_pool_offset(1 << 20).unwrap(), -3);
    assert_eq!(hash.add_by_pool_offset(150).unwrap(), -(4 + 50) - 1);
}

#[test]
fn test_offset_ids_read_records_written_through_pool() {
    let mut hash = new_hash();
    let pool = hash.pool_mut();
    let xyz = pool.position();
    pool.append(&[3]).unwrap();
    pool.append(b"xyz").unwrap();
    let ab = pool.position();
    pool.append(&[2]).unwrap();
    pool.append(b"ab").unwrap();

    assert_eq!(hash.add_by_pool_offset(xyz).unwrap(), 0);
    assert_eq!(hash.add_by_pool_offset(ab).unwrap(), 1);
    assert_eq!(hash.add_by_pool_offset(xyz).unwrap(), -1);
    assert_eq!(hash.get(0), b"xyz");
    assert_eq!(hash.get(1), b"ab");

    assert_eq!(hash.sort().unwrap().to_vec(), vec![1, 0]);
}

#[test]
fn test_hash_moves_to_builder_thread() {
    let counter = Counter::new();
    let pool = ByteBlockPool::new(DirectTrackingAllocator::new(counter.clone()));
    let mut hash = BytesRefHash::with_config(pool, HashConfig::default().with_seed(5), counter.clone());
    hash.add(b"main").unwrap();

    let hash = std::thread::spawn(move || {
        hash.add(b"worker").unwrap();
        hash
    })
    .join()
    .unwrap();

    assert_eq!(hash.len(), 2);
    assert_eq!(hash.find(b"worker"), Some(1));
    assert_eq!(counter.get(), BLOCK_SIZE as i64 + 16 * 4);
}

#[test]
fn test_tracking_allocator_accounts_pool_blocks() {
    let pool_bytes = Counter::new();
    let pool = ByteBlockPool::new(DirectTrackingAllocator::new(pool_bytes.clone()));
    let mut hash = BytesRefHash::with_config(pool, HashConfig::default().with_seed(4), Counter::new());

    for i in 0..5_000u32 {
        hash.add(format!("{i:>20}").as_bytes()).unwrap();
    }
    let blocks = hash.pool().block_count() as i64;
    assert!(blocks > 1);
    assert_eq!(pool_bytes.get(), blocks * BLOCK_SIZE as i64);

    hash.close();
    assert_eq!(pool_bytes.get(), 0);
}

#[test]
fn test_seed_does_not_change_results() {
    let terms: Vec<String> = (0..500).map(|i| format!("{}", i * 7919 % 1000)).collect();
    let mut orders = Vec::new();
    for seed in [0, 1, 0xdead_beef] {
        let mut hash = BytesRefHash::with_config(
            ByteBlockPool::default(),
            HashConfig::default().with_seed(seed),
            Counter::new(),
        );
        for t in &terms {
            hash.add(t.as_bytes()).unwrap();
        }
        let sorted = hash.sort().unwrap();
        orders.push(sorted.iter().map(|t| t.to_vec()).collect::<Vec<_>>());
    }
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[1], orders[2]);
}

proptest! {
    #[test]
    fn prop_round_trip_and_dedup(
        terms in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..300)
    ) {
        let mut hash = new_hash();
        let mut first_ids: HashMap<Vec<u8>, i32> = HashMap::new();

        for term in &terms {
            let id = hash.add(term).unwrap();
            match first_ids.get(term) {
                Some(&first) => prop_assert_eq!(id, -first - 1),
                None => {
                    prop_assert_eq!(id, first_ids.len() as i32);
                    first_ids.insert(term.clone(), id);
                }
            }
        }

        prop_assert_eq!(hash.len(), first_ids.len());
        for (term, &id) in &first_ids {
            prop_assert_eq!(hash.get(id), &term[..]);
            prop_assert_eq!(hash.find(term), Some(id));
        }
    }

    #[test]
    fn prop_sort_is_ordered_permutation(
        terms in prop::collection::vec(prop::collection::vec(0u8..4, 0..12), 0..400)
    ) {
        let mut hash = new_hash();
        for term in &terms {
            hash.add(term).unwrap();
        }
        let count = hash.len();
        let sorted = hash.sort().unwrap();

        let mut ids = sorted.to_vec();
        let terms_in_order: Vec<&[u8]> = sorted.iter().collect();
        prop_assert!(terms_in_order.windows(2).all(|w| w[0] < w[1]));

        ids.sort();
        prop_assert_eq!(ids, (0..count as i32).collect::<Vec<_>>());
    }
}
