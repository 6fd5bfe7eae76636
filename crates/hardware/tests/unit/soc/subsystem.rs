//! Top-level subsystem tests.

use crate::common::{data_read, data_write, fetch, idle_tick, subsystem, subsystem_with};
use memsim_core::MemorySubsystem;
use memsim_core::common::error::MemError;
use memsim_core::config::Config;
use memsim_core::core::cache::CpuRequest;
use memsim_core::core::cache::instr::InstrReq;

#[test]
fn invalid_geometry_is_rejected_at_build_time() {
    let mut config = Config::default();
    config.cache.l1_d.size_bytes = 1000;
    assert!(matches!(
        MemorySubsystem::new(&config),
        Err(MemError::Geometry { .. })
    ));
}

#[test]
fn inverted_initial_range_is_rejected() {
    let mut config = Config::default();
    config.system.non_cacheable_base = 0x2000;
    config.system.non_cacheable_limit = 0x1000;
    assert!(matches!(
        MemorySubsystem::new(&config),
        Err(MemError::Range { .. })
    ));
}

#[test]
fn range_setter_validates_and_keeps_previous_range() {
    let mut sub = subsystem();
    sub.set_non_cacheable_range(0x1000, 0x2000).unwrap();
    assert_eq!(
        sub.set_non_cacheable_range(0x3000, 0x2000),
        Err(MemError::Range {
            base: 0x3000,
            limit: 0x2000
        })
    );

    // The old range still routes around the cache.
    sub.lite_ram().write_u32(0x1800, 0x1E1E_1E1E);
    assert_eq!(data_read(&mut sub, 0x1800), 0x1E1E_1E1E);
    assert_eq!(sub.dcache().unwrap().stats().lite_reads, 1);
}

#[test]
fn combined_stall_follows_either_path() {
    let mut sub = subsystem();

    // Data miss stalls the combined output.
    let out = sub.tick(&InstrReq::default(), false, &CpuRequest::read(0x100));
    assert!(out.data.stall);
    assert!(out.stall);

    // Drain, then check a fetch miss also raises the combined stall.
    while sub
        .tick(&InstrReq::default(), false, &CpuRequest::read(0x100))
        .data
        .stall
    {}
    let out = sub.tick(
        &InstrReq {
            valid: true,
            addr: 0x5000,
        },
        true,
        &CpuRequest::default(),
    );
    assert!(out.instr.req_ready);
    let out = sub.tick(&InstrReq::default(), true, &CpuRequest::default());
    assert!(out.stall, "in-flight fetch must raise the combined stall");
    assert!(!out.data.stall, "data path is independent of the fetch path");
}

#[test]
fn uncached_data_path_uses_the_lite_store() {
    let mut sub = subsystem_with(|c| c.cache.l1_d.enabled = false);
    assert!(sub.dcache().is_none());

    data_write(&mut sub, 0x100, 0xCAFE_0001);
    assert_eq!(sub.lite_ram().read_u32(0x100), 0xCAFE_0001);
    assert_eq!(data_read(&mut sub, 0x100), 0xCAFE_0001);

    // The burst RAM is untouched by the uncached data path.
    assert_eq!(sub.ram().read_u32(0x100), 0);
}

#[test]
fn uncached_data_path_coexists_with_cached_fetches() {
    let mut sub = subsystem_with(|c| c.cache.l1_d.enabled = false);
    sub.ram().write_u32(0x200, 0x0001_0203);
    sub.lite_ram().write_u32(0x200, 0x0A0B_0C0D);

    assert_eq!(fetch(&mut sub, 0x200), 0x0001_0203);
    assert_eq!(data_read(&mut sub, 0x200), 0x0A0B_0C0D);
}

#[test]
fn load_image_is_visible_through_both_paths() {
    let mut sub = subsystem();
    let image: Vec<u8> = (0u32..64).flat_map(|i| (0x100 + i).to_le_bytes()).collect();
    sub.load_image(&image, 0x800).unwrap();

    assert_eq!(data_read(&mut sub, 0x800), 0x100);
    assert_eq!(fetch(&mut sub, 0x804), 0x101);
}

#[test]
fn load_image_overflow_is_reported() {
    let mut sub = subsystem_with(|c| c.memory.main_size = 4096);
    assert!(matches!(
        sub.load_image(&[0; 64], 4090),
        Err(MemError::ImageOverflow { .. })
    ));
}

#[test]
fn reset_invalidates_both_arrays_but_keeps_memory() {
    let mut sub = subsystem();
    data_write(&mut sub, 0x300, 0x3333_0000);
    sub.ram().write_u32(0x700, 0x7000_0007);
    assert_eq!(fetch(&mut sub, 0x700), 0x7000_0007);

    sub.reset();

    // The dirty line died with the reset: memory still holds the old value
    // and the next accesses miss again.
    assert_eq!(sub.ram().read_u32(0x300), 0);
    let d_misses = sub.dcache().unwrap().stats().misses;
    let i_misses = sub.icache().stats().misses;
    assert_eq!(data_read(&mut sub, 0x300), 0);
    assert_eq!(fetch(&mut sub, 0x700), 0x7000_0007);
    assert_eq!(sub.dcache().unwrap().stats().misses, d_misses + 1);
    assert_eq!(sub.icache().stats().misses, i_misses + 1);
}

#[test]
fn cycle_and_stall_counters_advance() {
    let mut sub = subsystem();
    let _ = idle_tick(&mut sub);
    let _ = idle_tick(&mut sub);
    assert_eq!(sub.stats().subsystem.cycles, 2);
    assert_eq!(sub.stats().subsystem.data_stall_cycles, 0);

    let _ = data_read(&mut sub, 0x40);
    let report = sub.stats();
    assert!(report.subsystem.cycles > 2);
    assert!(report.subsystem.data_stall_cycles > 0);
}
