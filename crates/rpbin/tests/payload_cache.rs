//! Integration tests for the payload cache over real files.

use std::path::PathBuf;

use rpbin::{Payload, PayloadCache, PayloadQuery, RawPixelPayload, RpBinConfig, RpBinWriter};
use test_utils::{create_rain_grid, frame_file_name, temp_test_dir};

fn write_frames(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let grid = create_rain_grid(24, 24, 14, i as u32);
            let raw = RawPixelPayload::from_grid(24, 24, 0, 0, grid).unwrap();
            let mut writer = RpBinWriter::new();
            writer.add_raw_with_rescales(raw, &[2, 3]).unwrap();

            let path = dir.join(frame_file_name(i));
            writer.write(&path).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_sliding_window_hits() {
    let dir = temp_test_dir();
    let frames = write_frames(dir.path(), 4);
    let mut cache = PayloadCache::new(RpBinConfig::default().cache_capacity);
    let query = PayloadQuery::Raw { scale: 2 };

    // Windows of three consecutive frames.
    for start in 0..2 {
        for path in &frames[start..start + 3] {
            let payload = cache.get_or_load(path, query).unwrap().unwrap();
            match payload.as_ref() {
                Payload::Raw(raw) => assert_eq!(raw.scaling(), 2),
                other => panic!("expected raw payload, got {:?}", other.kind()),
            }
        }
    }

    let stats = cache.stats();
    // Frames 1 and 2 are read once and then served from the cache.
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 4);
    // Each read caches all three scales.
    assert_eq!(stats.entries, 12);
}

#[test]
fn test_load_populates_sibling_scales() {
    let dir = temp_test_dir();
    let frames = write_frames(dir.path(), 1);
    let mut cache = PayloadCache::new(8);

    cache
        .get_or_load(&frames[0], PayloadQuery::Raw { scale: 1 })
        .unwrap()
        .unwrap();
    assert!(cache.contains(&frames[0], PayloadQuery::Raw { scale: 3 }));

    let third = cache
        .get_or_load(&frames[0], PayloadQuery::Raw { scale: 3 })
        .unwrap()
        .unwrap();
    assert_eq!(third.as_raw().map(|raw| raw.width()), Some(8));
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_absent_payload_is_none() {
    let dir = temp_test_dir();
    let frames = write_frames(dir.path(), 1);
    let mut cache = PayloadCache::new(8);

    assert!(cache
        .get_or_load(&frames[0], PayloadQuery::Prepared)
        .unwrap()
        .is_none());
    assert!(cache
        .get_or_load(&frames[0], PayloadQuery::Raw { scale: 5 })
        .unwrap()
        .is_none());
}

#[test]
fn test_small_cache_evicts() {
    let dir = temp_test_dir();
    let frames = write_frames(dir.path(), 2);
    let mut cache = PayloadCache::new(3);

    cache.get_or_load(&frames[0], PayloadQuery::Raw { scale: 1 }).unwrap();
    cache.get_or_load(&frames[1], PayloadQuery::Raw { scale: 1 }).unwrap();

    // The second file's siblings find no spare room; only its requested
    // payload displaces the least recently used entry.
    assert_eq!(cache.len(), 3);
    assert!(cache.contains(&frames[1], PayloadQuery::Raw { scale: 1 }));
    assert!(!cache.contains(&frames[1], PayloadQuery::Raw { scale: 2 }));
    assert!(cache.contains(&frames[0], PayloadQuery::Raw { scale: 1 }));
    assert!(!cache.contains(&frames[0], PayloadQuery::Raw { scale: 2 }));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_capacity_below_payloads_per_file() {
    let dir = temp_test_dir();
    let frames = write_frames(dir.path(), 1);
    let mut cache = PayloadCache::new(2);
    let query = PayloadQuery::Raw { scale: 1 };

    for _ in 0..3 {
        let payload = cache.get_or_load(&frames[0], query).unwrap().unwrap();
        assert_eq!(payload.as_raw().map(|raw| raw.scaling()), Some(1));
    }

    assert!(cache.contains(&frames[0], query));
    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.evictions, 0);
}
