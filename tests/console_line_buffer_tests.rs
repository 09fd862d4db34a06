//! Line buffer tests

use rust_wavegen::console::line_buffer::{LineBuffer, LINE_SIZE};

#[test]
fn test_line_buffer_push() {
    let mut buf = LineBuffer::new();
    for &b in b"reset" {
        assert!(buf.push(b));
    }
    assert_eq!(buf.as_str(), "reset");
    assert_eq!(buf.len(), 5);
}

#[test]
fn test_line_buffer_backspace() {
    let mut buf = LineBuffer::new();
    for &b in b"freq 3" {
        buf.push(b);
    }
    assert!(buf.backspace());
    assert!(buf.backspace());
    assert_eq!(buf.as_str(), "freq");

    buf.clear();
    assert!(buf.is_empty());
    assert!(!buf.backspace());
}

#[test]
fn test_line_buffer_refuses_overflow() {
    let mut buf = LineBuffer::new();
    for _ in 0..LINE_SIZE {
        assert!(buf.push(b'x'));
    }
    assert!(buf.is_full());
    assert!(!buf.push(b'y'));
    assert_eq!(buf.len(), LINE_SIZE);
    assert!(!buf.as_str().contains('y'));
}
