//! L2 cache unit tests.
//!
//! Exercises the 2-way set-associative lookup, the single-bit LRU victim
//! policy, write-back of dirty victims, and the way-dump layout.
//!
//! All tests use the small fixture geometry: 256 bytes, 16-byte blocks,
//! 8 sets, so addresses 128 bytes apart share a set.

use pretty_assertions::assert_eq;

use memsim_core::mem::MemoryLevel;

use crate::common::{l2_over_memory, patterned_image};

/// Same-set stride of the fixture geometry (num_sets * block).
const SET_STRIDE: u32 = 128;

/// Cold load: fetch the 16-byte block from memory (100 + 1 cc) and serve
/// the word over the 256-bit bus (4 cc).
#[test]
fn cold_read_miss_costs_105() {
    let image = patterned_image(1024);
    let mut l2 = l2_over_memory(image.clone());

    let (data, cycles) = l2.load(0x40, 4).unwrap();
    assert_eq!(data, image[0x40..0x44].to_vec());
    assert_eq!(cycles, 101 + 4);
    assert_eq!(l2.counters().read_misses, 1);
}

#[test]
fn warm_read_hits_in_hit_time() {
    let image = patterned_image(1024);
    let mut l2 = l2_over_memory(image);

    let _ = l2.load(0x40, 4).unwrap();
    let (_, cycles) = l2.load(0x40, 4).unwrap();
    assert_eq!(cycles, 4);
    assert_eq!(l2.counters().read_hits, 1);
}

/// A fill covers the whole block, so any word of it hits afterwards.
#[test]
fn fill_serves_other_words_of_the_block() {
    let image = patterned_image(1024);
    let mut l2 = l2_over_memory(image.clone());

    let _ = l2.load(0x40, 4).unwrap();
    let (data, cycles) = l2.load(0x48, 4).unwrap();
    assert_eq!(data, image[0x48..0x4C].to_vec());
    assert_eq!(cycles, 4);
}

/// Three tags mapping to one set: the LRU way (holding the first tag) is
/// replaced, the second survives.
#[test]
fn third_tag_evicts_least_recently_used() {
    let mut l2 = l2_over_memory(patterned_image(1024));
    let a = 0x40_u32;
    let b = a + SET_STRIDE;
    let c = a + 2 * SET_STRIDE;

    let _ = l2.load(a, 4).unwrap();
    let _ = l2.load(b, 4).unwrap();
    assert!(l2.is_present(a));
    assert!(l2.is_present(b));

    let _ = l2.load(c, 4).unwrap();
    assert!(!l2.is_present(a), "LRU victim should be evicted");
    assert!(l2.is_present(b), "recently filled way should survive");
    assert!(l2.is_present(c));
}

/// A hit refreshes recency: after touching the older way, the other way
/// becomes the victim.
#[test]
fn hit_flips_the_victim_way() {
    let mut l2 = l2_over_memory(patterned_image(1024));
    let a = 0x40_u32;
    let b = a + SET_STRIDE;
    let c = a + 2 * SET_STRIDE;

    let _ = l2.load(a, 4).unwrap();
    let _ = l2.load(b, 4).unwrap();
    let _ = l2.load(a, 4).unwrap(); // a is now most recent
    let _ = l2.load(c, 4).unwrap(); // evicts b

    assert!(l2.is_present(a));
    assert!(!l2.is_present(b));
    assert!(l2.is_present(c));
}

/// A dirty block conflict-evicted by two later fills is written back, and
/// a fresh load of it returns the written bytes from memory.
#[test]
fn dirty_victim_is_written_back() {
    let mut l2 = l2_over_memory(vec![]);
    let a = 0x40_u32;
    let b = a + SET_STRIDE;
    let c = a + 2 * SET_STRIDE;

    let _ = l2.store(a, &[0xDE, 0xC0, 0xAD, 0x0B]).unwrap();
    let _ = l2.load(b, 4).unwrap();
    let _ = l2.load(c, 4).unwrap(); // evicts the dirty block at a

    assert!(!l2.is_present(a));
    let images = l2.dump_images();
    assert_eq!(images[2][0x40..0x44], [0xDE, 0xC0, 0xAD, 0x0B]);

    // The flushed bytes survive a round-trip through memory.
    let (data, _) = l2.load(a, 4).unwrap();
    assert_eq!(data, vec![0xDE, 0xC0, 0xAD, 0x0B]);
}

/// Write-back during a conflict fill charges the memory store on top of
/// the fetch and the serve.
#[test]
fn eviction_cycles_include_write_back() {
    let mut l2 = l2_over_memory(vec![]);
    let a = 0x40_u32;
    let b = a + SET_STRIDE;
    let c = a + 2 * SET_STRIDE;

    let _ = l2.store(a, &[1, 2, 3, 4]).unwrap();
    let _ = l2.load(b, 4).unwrap();
    // Fetch 16 B (101) + flush 16 B to memory (101) + serve word (4).
    let (_, cycles) = l2.load(c, 4).unwrap();
    assert_eq!(cycles, 101 + 101 + 4);
}

/// Way dumps concatenate each set's line in set order; the first fill of a
/// set lands in way 0.
#[test]
fn way_dump_layout_follows_set_order() {
    let image = patterned_image(1024);
    let mut l2 = l2_over_memory(image.clone());
    let addr = 0x40_u32; // set 4 in the fixture geometry

    let _ = l2.load(addr, 4).unwrap();
    let images = l2.dump_images();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0].len(), 128);
    assert_eq!(images[1].len(), 128);
    assert_eq!(images[0][64..80], image[0x40..0x50]);
    assert_eq!(images[1][64..80], [0; 16]);
}

/// Both tags of a set stay resident side by side; neither fill disturbs
/// the other way's data.
#[test]
fn ways_hold_distinct_tags() {
    let image = patterned_image(1024);
    let mut l2 = l2_over_memory(image.clone());
    let a = 0x40_u32;
    let b = a + SET_STRIDE;

    let _ = l2.load(a, 4).unwrap();
    let _ = l2.load(b, 4).unwrap();

    let (data_a, _) = l2.load(a, 4).unwrap();
    let (data_b, _) = l2.load(b, 4).unwrap();
    assert_eq!(data_a, image[0x40..0x44].to_vec());
    assert_eq!(data_b, image[0xC0..0xC4].to_vec());
    assert_eq!(l2.counters().read_hits, 2);
}
