//! MCP4921 12-bit SPI DAC
//!
//! One 16-bit word per sample. The bus is a non-blocking `FullDuplex<u16>`
//! with hardware chip select, so `try_send` only ever starts a transfer:
//! while the previous frame is still shifting out the bus answers
//! `WouldBlock` and the sample is dropped.

use embedded_hal_nb::spi::FullDuplex;

use crate::sink::{DacCode, DacFrame, SampleSink};

/// MCP4921 behind a non-blocking SPI bus
pub struct Mcp4921<SPI> {
    spi: SPI,
    errors: u32,
}

impl<SPI: FullDuplex<u16>> Mcp4921<SPI> {
    /// Wrap an SPI bus (mode 0, 16-bit words, up to 20 MHz)
    pub fn new(spi: SPI) -> Self {
        Self { spi, errors: 0 }
    }

    /// Samples lost to bus errors
    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// Give the SPI bus back
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: FullDuplex<u16>> SampleSink for Mcp4921<SPI> {
    #[inline]
    fn try_send(&mut self, code: DacCode) -> bool {
        match self.spi.write(DacFrame::new(code).word()) {
            Ok(()) => true,
            Err(nb::Error::WouldBlock) => false,
            Err(nb::Error::Other(_)) => {
                self.errors = self.errors.wrapping_add(1);
                false
            }
        }
    }
}
