use super::*;

#[test]
fn fake_clock_advances_both_instant_and_epoch() {
    let clock = FakeClock::new();
    let before = clock.now();
    let before_epoch = clock.epoch_ms();

    clock.advance(Duration::from_millis(500));

    assert_eq!(clock.now(), before + Duration::from_millis(500));
    assert_eq!(clock.epoch_ms(), before_epoch + 500);
}

#[test]
fn fake_clock_set_epoch_ms_is_absolute() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    let ms = clock.epoch_ms();
    // Year 2020 in epoch millis, as a sanity floor.
    assert!(ms > 1_577_836_800_000);
}
