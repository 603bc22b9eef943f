//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  4   | LCD DISP        | Display enable, HIGH = on
//!  5   | LCD EXTCOMIN    | Tied low; VCOM is toggled over SPI
//!  8   | SPI2 SCK        | LCD clock
//! 10   | SPI2 MOSI       | LCD data (panel is write-only)
//! 21   | LCD SCS         | Chip select, active HIGH

// ----- Memory LCD -----
pub const LCD_CS: u8 = 21;
pub const LCD_DISP: u8 = 4;
pub const LCD_EXTCOMIN: u8 = 5;

// ----- SPI Bus -----
pub const SPI_SCK: u8 = 8;
pub const SPI_MOSI: u8 = 10;
