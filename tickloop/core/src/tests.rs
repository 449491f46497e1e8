use alloc::vec::Vec;

use crate::trace::{decode_payload, decode_task, encode_payload};
use crate::{IdAllocator, ManualClock, Millis, TaskId, TimeSource, Timestamp};

#[test]
fn timestamp_due_comparison() {
    let now = Timestamp::from_millis(100);
    assert!(now.has_reached(Timestamp::from_millis(100)));
    assert!(now.has_reached(Timestamp::from_millis(99)));
    assert!(!now.has_reached(Timestamp::from_millis(101)));
}

#[test]
fn timestamp_until_saturates() {
    let now = Timestamp::from_millis(40);
    assert_eq!(now.saturating_until(Timestamp::from_millis(55)), Millis::from_millis(15));
    assert_eq!(now.saturating_until(Timestamp::from_millis(10)), Millis::ZERO);
}

#[test]
fn timestamp_add_wraps() {
    let near_end = Timestamp::from_millis(u32::MAX - 1);
    assert_eq!(near_end + Millis::from_millis(3), Timestamp::from_millis(1));
}

#[test]
fn millis_macro_and_conversions() {
    assert_eq!(crate::millis!(250 ms), Millis::from_millis(250));
    assert_eq!(crate::millis!(2 s).as_millis(), 2000);
    assert_eq!(Millis::from(7u32).as_millis(), 7);
    assert_eq!(Millis::from_secs(3).as_secs(), 3);
    assert!(Millis::ZERO.is_zero());
}

#[test]
fn manual_clock_clones_share_time() {
    let clock = ManualClock::new();
    let handle = clock.clone();

    handle.advance(25u32);
    assert_eq!(clock.now(), Timestamp::from_millis(25));

    clock.set(Timestamp::from_millis(1000));
    assert_eq!(handle.now().as_millis(), 1000);
}

#[test]
fn closure_is_a_time_source() {
    let source = || 1234u32;
    assert_eq!(source.now(), Timestamp::from_millis(1234));
}

#[test]
fn allocator_issues_sequential_ids() {
    let mut ids = IdAllocator::new();
    let issued: Vec<u32> = (0..4).map(|_| ids.issue(|_| false).raw()).collect();
    assert_eq!(issued, [0, 1, 2, 3]);
    assert!(!ids.has_wrapped());
}

#[test]
fn allocator_skips_live_ids_after_wrap() {
    let mut ids = IdAllocator::starting_at(u32::MAX);
    assert_eq!(ids.issue(|_| false), TaskId::new(u32::MAX));
    assert!(ids.has_wrapped());

    // 0 and 1 are still owned by long-lived tasks.
    let live = [TaskId::new(0), TaskId::new(1)];
    assert_eq!(ids.issue(|id| live.contains(&id)), TaskId::new(2));
}

#[test]
fn payload_layout_is_little_endian() {
    let payload = encode_payload(0x0102_0304, Timestamp::from_millis(0x0A0B_0C0D));
    assert_eq!(
        payload.as_slice(),
        &[0x04, 0x03, 0x02, 0x01, 0x0D, 0x0C, 0x0B, 0x0A]
    );
    assert_eq!(
        decode_task(&payload),
        Some((TaskId::new(0x0102_0304), Timestamp::from_millis(0x0A0B_0C0D)))
    );
    assert_eq!(decode_payload(&payload[..4]), None);
}
