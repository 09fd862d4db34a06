//! Sample dispatcher tests

use rust_wavegen::{
    CaptureSink, ControlState, DacCalibration, DacCode, FrequencyIndex, SampleDispatcher,
    SampleSink, Shape, TickLatch, TickOutcome,
};

fn tick<S: SampleSink>(d: &mut SampleDispatcher<'_, S>, latch: &TickLatch) -> TickOutcome {
    latch.raise();
    let mut timer = latch;
    d.on_tick(&mut timer)
}

#[test]
fn test_default_output_is_square_high() {
    let state = ControlState::new();
    let latch = TickLatch::new();
    let mut d = SampleDispatcher::new(&state, CaptureSink::<8>::new(), DacCalibration::DEFAULT);

    assert_eq!(tick(&mut d, &latch), TickOutcome::Sent(DacCode::saturating(3818)));
}

#[test]
fn test_sawtooth_revisits_zero_code() {
    for n in 1..=5u8 {
        let state = ControlState::new();
        state.set_shape(Shape::Sawtooth);
        state.set_frequency(FrequencyIndex::new(n).unwrap());

        let latch = TickLatch::new();
        let mut d = SampleDispatcher::new(&state, CaptureSink::<256>::new(), DacCalibration::DEFAULT);

        let ticks = 195usize.div_ceil(n as usize);
        for _ in 0..=ticks {
            tick(&mut d, &latch);
        }

        let codes = d.sink().codes();
        assert_eq!(codes[0], DacCode::ZERO, "step {}", n);
        assert_eq!(codes[ticks], DacCode::ZERO, "step {}", n);
        assert!(codes[1..ticks].iter().all(|&c| c != DacCode::ZERO), "step {}", n);
    }
}

#[test]
fn test_busy_sink_drops_but_cursor_advances() {
    let state = ControlState::new();
    state.set_shape(Shape::Sawtooth);
    let latch = TickLatch::new();
    let mut d = SampleDispatcher::new(&state, CaptureSink::<8>::new(), DacCalibration::DEFAULT);

    d.sink_mut().set_busy(true);
    for _ in 0..10 {
        assert_eq!(tick(&mut d, &latch), TickOutcome::Dropped);
    }
    d.sink_mut().set_busy(false);
    tick(&mut d, &latch);

    // Index 10: 16 -> 4096*16/330 - 4
    assert_eq!(d.sink().codes(), &[DacCode::saturating(194)]);
}

#[test]
fn test_every_invocation_clears_once() {
    let state = ControlState::new();
    let latch = TickLatch::new();
    let mut d = SampleDispatcher::new(&state, CaptureSink::<8>::new(), DacCalibration::DEFAULT);

    tick(&mut d, &latch);
    tick(&mut d, &latch);
    let mut timer = &latch;
    assert_eq!(d.on_tick(&mut timer), TickOutcome::Spurious);

    assert_eq!(latch.clears(), 3);
    assert_eq!(d.sink().len(), 2);
}

#[test]
fn test_shape_switch_never_reads_past_period() {
    let state = ControlState::new();
    let latch = TickLatch::new();
    let mut d = SampleDispatcher::new(&state, CaptureSink::<4096>::new(), DacCalibration::DEFAULT);

    state.set_frequency(FrequencyIndex::MAX);
    for (i, shape) in Shape::ALL.iter().cycle().take(40).enumerate() {
        state.set_shape(*shape);
        for _ in 0..(i * 7) % 90 {
            assert!(matches!(tick(&mut d, &latch), TickOutcome::Sent(_)));
        }
    }
}

#[test]
fn test_held_critical_section_stops_output() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    static STATE: ControlState = ControlState::new();
    let sent = AtomicUsize::new(0);

    let seen_while_held = std::thread::scope(|s| {
        // Same lock the fail-safe halt takes and never gives back
        let restore = unsafe { critical_section::acquire() };
        s.spawn(|| {
            let latch = TickLatch::new();
            let mut d = SampleDispatcher::new(&STATE, CaptureSink::<4>::new(), DacCalibration::DEFAULT);
            if let TickOutcome::Sent(_) = tick(&mut d, &latch) {
                sent.fetch_add(1, Ordering::SeqCst);
            }
        });
        std::thread::sleep(Duration::from_millis(50));
        let seen = sent.load(Ordering::SeqCst);
        unsafe { critical_section::release(restore) };
        seen
    });

    assert_eq!(seen_while_held, 0);
    assert_eq!(sent.load(Ordering::SeqCst), 1);
}
