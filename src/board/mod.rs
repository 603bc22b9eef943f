//! ESP32-C3 + Sharp memory LCD board support
//!
//! Maps the physical hardware to named subsystems so the face and the
//! main loop never see GPIO numbers. Pin table in [`pins`].

pub mod pins;

pub use crate::drivers::memlcd::SPI_FREQ_MHZ;
pub use crate::ui::{SCREEN_H, SCREEN_W};

use esp_hal::{
    Blocking,
    gpio::{Level, Output, OutputConfig},
    peripherals::Peripherals,
    spi,
    time::Rate,
};

use crate::drivers::MemLcd;

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type Lcd = MemLcd<SpiBus, Output<'static>>;

/// Display subsystem hardware: panel driver plus its enable line.
pub struct DisplayHw {
    pub lcd: Lcd,
    pub disp: Output<'static>,
    // held low for the panel's lifetime
    _extcomin: Output<'static>,
}

impl DisplayHw {
    pub fn enable(&mut self) {
        self.disp.set_high();
    }
}

/// Complete board hardware, ready for driver initialization.
pub struct Board {
    pub display: DisplayHw,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        Board {
            display: Self::init_display(p),
        }
    }

    fn init_display(p: Peripherals) -> DisplayHw {
        // SCS idles low on this panel
        let cs = Output::new(p.GPIO21, Level::Low, OutputConfig::default());
        let disp = Output::new(p.GPIO4, Level::Low, OutputConfig::default());
        let extcomin = Output::new(p.GPIO5, Level::Low, OutputConfig::default());

        // SPI mode 0, MSB first
        let spi_cfg = spi::master::Config::default()
            .with_frequency(Rate::from_mhz(SPI_FREQ_MHZ))
            .with_mode(spi::Mode::_0);
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)
            .unwrap()
            .with_sck(p.GPIO8)
            .with_mosi(p.GPIO10);

        log::info!(
            "[BOARD] lcd cs={} disp={} sck={} mosi={} @ {}MHz",
            pins::LCD_CS,
            pins::LCD_DISP,
            pins::SPI_SCK,
            pins::SPI_MOSI,
            SPI_FREQ_MHZ
        );
        DisplayHw {
            lcd: MemLcd::new(spi_bus, cs),
            disp,
            _extcomin: extcomin,
        }
    }
}
