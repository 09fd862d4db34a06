//! Fatal initialization errors and the fail-safe halt.
//!
//! # Philosophy
//!
//! > A generator that emits a wrong waveform is broken.
//! > A generator that emits nothing is safe.
//!
//! Anything that goes wrong before the tick starts is fatal: log it, then
//! stop holding the shared-state lock so the DAC holds its last value.

/// Peripheral that failed to come up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum InitError {
    /// System clock or timer source configuration.
    Clock = 1,
    /// SPI bus or DAC device.
    Spi = 2,
    /// Tick timer (alarm, interrupt subscription).
    Timer = 3,
    /// Keypad or display pins.
    Gpio = 4,
    /// Display power-up sequence.
    Display = 5,
    /// Real-time task creation.
    Task = 6,
}

impl InitError {
    /// Numeric code, also shown as `I0x` in the log.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Short description.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Clock => "clock setup failed",
            Self::Spi => "SPI/DAC setup failed",
            Self::Timer => "tick timer setup failed",
            Self::Gpio => "GPIO setup failed",
            Self::Display => "display init failed",
            Self::Task => "RT task spawn failed",
        }
    }
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "I{:02}: {}", self.code(), self.message())
    }
}

/// Stop forever.
///
/// Enters a critical section that is never released, then spins. The RT
/// task blocks on its next `ControlState::fetch`, so no further sample
/// reaches the DAC.
///
/// On ESP-IDF the critical section is the esp-idf-hal one (a FreeRTOS
/// recursive mutex). It stops the other task, not the timer interrupt,
/// which only notifies.
pub fn halt() -> ! {
    // SAFETY: the matching release never runs; nothing else may execute.
    let _restore = unsafe { critical_section::acquire() };
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_error_codes_unique() {
        let all = [
            InitError::Clock,
            InitError::Spi,
            InitError::Timer,
            InitError::Gpio,
            InitError::Display,
            InitError::Task,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn test_init_error_display() {
        assert_eq!(format!("{}", InitError::Spi), "I02: SPI/DAC setup failed");
        assert_eq!(format!("{}", InitError::Task), "I06: RT task spawn failed");
    }
}
