// Sharp memory LCD driver (LS013B7DH05, 144x168), board-independent
// Write-only SPI, chip select active HIGH (so no SpiDevice; CS is
// driven here). Each update is one CS window:
//   mode byte, then per line [address, 18 data bytes, 0x00], then 0x00.
// Line addresses are 1-based and sent LSB first. Pixel data goes out
// MSB first, which matches the frame buffer layout. VCOM must flip
// about once a second or the panel builds up a DC bias.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::framebuffer::{BYTES_PER_ROW, FrameBuffer, HEIGHT};

pub const SPI_FREQ_MHZ: u32 = 2;

mod cmd {
    pub const WRITE_LINE: u8 = 0x80;
    pub const VCOM: u8 = 0x40;
    pub const CLEAR: u8 = 0x20;
}

// CS setup / hold around a transfer
const CS_SETUP_US: u32 = 3;
const CS_HOLD_US: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError<S, P> {
    Spi(S),
    Pin(P),
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for LcdError<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcdError::Spi(e) => write!(f, "spi: {:?}", e),
            LcdError::Pin(e) => write!(f, "chip select: {:?}", e),
        }
    }
}

// gate address: 1-based, LSB first on an MSB-first bus
#[inline]
pub const fn line_address(y: u16) -> u8 {
    ((y + 1) as u8).reverse_bits()
}

pub struct MemLcd<SPI, CS> {
    spi: SPI,
    cs: CS,
    vcom: bool,
}

impl<SPI, CS> MemLcd<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            vcom: false,
        }
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn mode(&self, bits: u8) -> u8 {
        if self.vcom { bits | cmd::VCOM } else { bits }
    }

    fn transaction<F>(&mut self, delay: &mut impl DelayNs, body: F) -> Result<(), LcdError<SPI::Error, CS::Error>>
    where
        F: FnOnce(&mut SPI) -> Result<(), SPI::Error>,
    {
        self.cs.set_high().map_err(LcdError::Pin)?;
        delay.delay_us(CS_SETUP_US);
        let result = body(&mut self.spi).and_then(|()| self.spi.flush());
        delay.delay_us(CS_HOLD_US);
        // always drop CS, even after a failed transfer
        self.cs.set_low().map_err(LcdError::Pin)?;
        result.map_err(LcdError::Spi)
    }

    /// Reset panel memory to white. The frame buffer is untouched.
    pub fn clear(&mut self, delay: &mut impl DelayNs) -> Result<(), LcdError<SPI::Error, CS::Error>> {
        let frame = [self.mode(cmd::CLEAR), 0x00];
        self.transaction(delay, |spi| spi.write(&frame))
    }

    /// Send the rows of `fb` marked dirty and clear their marks.
    /// Returns the number of lines written.
    pub fn flush(
        &mut self,
        fb: &mut FrameBuffer,
        delay: &mut impl DelayNs,
    ) -> Result<usize, LcdError<SPI::Error, CS::Error>> {
        if !fb.has_dirty() {
            return Ok(0);
        }

        let mode = self.mode(cmd::WRITE_LINE);
        let mut lines = 0;
        self.transaction(delay, |spi| {
            spi.write(&[mode])?;
            let mut line = [0u8; BYTES_PER_ROW + 2];
            for y in (0..HEIGHT).filter(|&y| fb.is_row_dirty(y)) {
                line[0] = line_address(y);
                line[1..=BYTES_PER_ROW].copy_from_slice(fb.row(y));
                line[BYTES_PER_ROW + 1] = 0x00;
                spi.write(&line)?;
                lines += 1;
            }
            spi.write(&[0x00])
        })?;

        fb.clear_dirty();
        log::trace!("[LCD] flushed {} lines", lines);
        Ok(lines)
    }

    /// Flip VCOM without touching pixel data.
    pub fn toggle_vcom(&mut self, delay: &mut impl DelayNs) -> Result<(), LcdError<SPI::Error, CS::Error>> {
        self.vcom = !self.vcom;
        let frame = [self.mode(0x00), 0x00];
        self.transaction(delay, |spi| spi.write(&frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

    #[derive(Default)]
    struct MockSpi {
        bytes: Vec<u8>,
    }

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            words.fill(0);
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            self.bytes.extend_from_slice(words);
            Ok(())
        }
        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            read.fill(0);
            self.bytes.extend_from_slice(write);
            Ok(())
        }
        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            self.bytes.extend_from_slice(words);
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPin {
        high: bool,
        edges: usize,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.edges += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.edges += 1;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_line_address_is_lsb_first() {
        assert_eq!(line_address(0), 0b1000_0000);
        assert_eq!(line_address(1), 0b0100_0000);
        assert_eq!(line_address(167), 168u8.reverse_bits());
    }

    #[test]
    fn test_flush_sends_only_dirty_lines() {
        let mut lcd = MemLcd::new(MockSpi::default(), MockPin::default());
        let mut fb = FrameBuffer::new();
        fb.clear_dirty();
        Pixel(Point::new(0, 5), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(143, 7), BinaryColor::On).draw(&mut fb).unwrap();

        let n = lcd.flush(&mut fb, &mut NoDelay).unwrap();
        assert_eq!(n, 2);
        assert!(!fb.has_dirty());

        let (spi, cs) = lcd.release();
        let b = &spi.bytes;
        assert_eq!(b.len(), 1 + 2 * 20 + 1);
        assert_eq!(b[0], 0x80);
        assert_eq!(b[1], line_address(5));
        assert_eq!(b[2], 0x80);
        assert_eq!(b[20], 0x00);
        assert_eq!(b[21], line_address(7));
        assert_eq!(b[21 + 18], 0x01);
        assert_eq!(*b.last().unwrap(), 0x00);
        assert!(!cs.high);
        assert_eq!(cs.edges, 2);
    }

    #[test]
    fn test_clean_buffer_sends_nothing() {
        let mut lcd = MemLcd::new(MockSpi::default(), MockPin::default());
        let mut fb = FrameBuffer::new();
        fb.clear_dirty();
        assert_eq!(lcd.flush(&mut fb, &mut NoDelay).unwrap(), 0);
        assert!(lcd.release().0.bytes.is_empty());
    }

    #[test]
    fn test_vcom_bit_follows_toggle() {
        let mut lcd = MemLcd::new(MockSpi::default(), MockPin::default());
        lcd.toggle_vcom(&mut NoDelay).unwrap();
        lcd.clear(&mut NoDelay).unwrap();
        lcd.toggle_vcom(&mut NoDelay).unwrap();

        let (spi, _) = lcd.release();
        assert_eq!(spi.bytes, [0x40, 0x00, 0x60, 0x00, 0x00, 0x00]);
    }
}
