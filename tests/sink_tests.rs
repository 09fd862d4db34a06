//! Sample sink and DAC encoding tests

use rust_wavegen::config::SQUARE_HIGH;
use rust_wavegen::{CaptureSink, DacCalibration, DacCode, DacFrame, SampleSink};

#[test]
fn test_calibration_points() {
    let cal = DacCalibration::DEFAULT;

    // Below the offset: saturates at 0
    assert_eq!(cal.to_code(0), DacCode::ZERO);
    assert_eq!(cal.to_code(1).get(), 8);
    assert_eq!(cal.to_code(SQUARE_HIGH).get(), 3818);
    assert_eq!(cal.to_code(330).get(), 4092);
}

#[test]
fn test_calibration_clamps_to_12_bits() {
    let cal = DacCalibration::DEFAULT;
    assert_eq!(cal.to_code(400), DacCode::MAX);
    assert_eq!(cal.to_code(u16::MAX), DacCode::MAX);
    assert_eq!(DacCode::MAX.get(), 0x0FFF);
}

#[test]
fn test_frame_layout() {
    let frame = DacFrame::new(DacCode::saturating(0x0ABC));
    assert_eq!(frame.word(), 0x3ABC);
    assert_eq!(frame.to_bytes(), [0x3A, 0xBC]);

    assert_eq!(DacFrame::new(DacCode::ZERO).to_bytes(), [0x30, 0x00]);
}

#[test]
fn test_capture_sink_busy_and_full() {
    let mut sink = CaptureSink::<2>::new();

    sink.set_busy(true);
    assert!(!sink.try_send(DacCode::MAX));
    assert!(sink.is_empty());

    sink.set_busy(false);
    assert!(sink.try_send(DacCode::saturating(1)));
    assert!(sink.try_send(DacCode::saturating(2)));
    assert!(!sink.try_send(DacCode::saturating(3)));

    assert_eq!(sink.len(), 2);
    assert_eq!(sink.last(), Some(DacCode::saturating(2)));

    sink.clear();
    assert!(sink.try_send(DacCode::saturating(4)));
}
