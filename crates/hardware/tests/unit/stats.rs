//! Statistics tests.

use crate::common::{data_read, data_write, run_flush, subsystem};
use memsim_core::stats::CacheStats;

#[test]
fn hit_rate_handles_empty_and_mixed_counts() {
    let empty = CacheStats::default();
    assert_eq!(empty.hit_rate(), 0.0);

    let mixed = CacheStats {
        hits: 3,
        misses: 1,
        ..CacheStats::default()
    };
    assert!((mixed.hit_rate() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn counters_track_a_known_sequence() {
    let mut sub = subsystem();

    let _ = data_read(&mut sub, 0x000); // miss
    let _ = data_read(&mut sub, 0x004); // hit, same line
    data_write(&mut sub, 0x008, 1); // hit, dirties the line
    let _ = data_read(&mut sub, 0x200); // miss, same set second way
    let _ = data_read(&mut sub, 0x200); // touch: 0x000 is now LRU
    let _ = data_read(&mut sub, 0x400); // miss, evicts dirty 0x000

    let stats = *sub.dcache().unwrap().stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.writebacks, 1);
    assert_eq!(stats.flushed_lines, 0);
}

#[test]
fn report_renders_all_sections() {
    let mut sub = subsystem();
    data_write(&mut sub, 0x40, 7);
    run_flush(&mut sub);

    let report = sub.stats();
    let text = report.to_string();
    assert!(text.contains("cycles:"));
    assert!(text.contains("instr:"));
    assert!(text.contains("data"));
    assert!(text.contains("hit rate"));
}
