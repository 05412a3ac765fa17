//! Read-only emulation of the controller's SPI flash regions.
//!
//! The host reads identity and calibration data from a virtual address space
//! during the handshake. Only the regions the host actually asks for are
//! served, each keyed by its exact start address.

/// Serial number region.
pub const ADDR_SERIAL_NUMBER: u16 = 0x6000;
/// Body/button/grip colours.
pub const ADDR_COLOR: u16 = 0x6050;
/// Factory motion sensor calibration.
pub const ADDR_FACTORY_SENSOR: u16 = 0x6080;
/// Factory stick calibration.
pub const ADDR_FACTORY_STICK: u16 = 0x6098;
/// Factory configuration and stick parameters.
pub const ADDR_FACTORY_CONFIG: u16 = 0x603D;
/// User stick calibration.
pub const ADDR_USER_STICK: u16 = 0x8010;
/// User motion calibration.
pub const ADDR_USER_MOTION: u16 = 0x8028;

const SERIAL_NUMBER: [u8; 16] = [0xFF; 16];

const COLOR: [u8; 13] = [
    0x29, 0xA9, 0xA9, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

const FACTORY_SENSOR: [u8; 24] = [
    0x50, 0xFD, 0x00, 0x00, 0xC6, 0x0F, 0x0F, 0x30, 0x61, 0x96, 0x30, 0xF3, 0xD4, 0x14, 0x54, 0x41,
    0x15, 0x54, 0xC7, 0x79, 0x9C, 0x33, 0x36, 0x63,
];

const FACTORY_STICK: [u8; 18] = [
    0x0F, 0x30, 0x61, 0x96, 0x30, 0xF3, 0xD4, 0x14, 0x54, 0x41, 0x15, 0x54, 0xC7, 0x79, 0x9C, 0x33,
    0x36, 0x63,
];

const FACTORY_CONFIG: [u8; 25] = [
    0xBA, 0x15, 0x62, 0x11, 0xB8, 0x7F, 0x29, 0x06, 0x5B, 0xFF, 0xE7, 0x7E, 0x0E, 0x36, 0x56, 0x9E,
    0x85, 0x60, 0xFF, 0x32, 0x32, 0x32, 0xFF, 0xFF, 0xFF,
];

// No user stick calibration stored: all 0xFF, trailing magic.
const USER_STICK: [u8; 24] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xB2, 0xA1,
];

const USER_MOTION: [u8; 24] = [
    0xBE, 0xFF, 0x3E, 0x00, 0xF0, 0x01, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40, 0xFE, 0xFF, 0xFE, 0xFF,
    0x08, 0x00, 0xE7, 0x3B, 0xE7, 0x3B, 0xE7, 0x3B,
];

/// One region of the virtual flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBlob {
    /// Start address of the region.
    pub address: u16,
    /// Region contents.
    pub data: &'static [u8],
}

impl CalibrationBlob {
    /// Length byte as reported on the wire.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u8 {
        self.data.len() as u8
    }

    /// Whether the region is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Regions served by [`CalibrationStore::DEFAULT`].
pub const DEFAULT_REGIONS: &[CalibrationBlob] = &[
    CalibrationBlob { address: ADDR_SERIAL_NUMBER, data: &SERIAL_NUMBER },
    CalibrationBlob { address: ADDR_COLOR, data: &COLOR },
    CalibrationBlob { address: ADDR_FACTORY_SENSOR, data: &FACTORY_SENSOR },
    CalibrationBlob { address: ADDR_FACTORY_STICK, data: &FACTORY_STICK },
    CalibrationBlob { address: ADDR_FACTORY_CONFIG, data: &FACTORY_CONFIG },
    CalibrationBlob { address: ADDR_USER_STICK, data: &USER_STICK },
    CalibrationBlob { address: ADDR_USER_MOTION, data: &USER_MOTION },
];

/// Fixed table of flash regions, looked up by exact start address.
///
/// The store holds only `'static` data and is `Sync`, so both execution
/// contexts may read it without coordination.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationStore {
    regions: &'static [CalibrationBlob],
}

impl CalibrationStore {
    /// Store serving the regions a Pro Controller exposes during pairing.
    pub const DEFAULT: Self = Self::new(DEFAULT_REGIONS);

    /// Create a store over a custom region table.
    #[must_use]
    pub const fn new(regions: &'static [CalibrationBlob]) -> Self {
        Self { regions }
    }

    /// Look up the region starting at `address`.
    ///
    /// Addresses inside a region but not at its start are not served.
    #[must_use]
    pub fn lookup(&self, address: u16) -> Option<&'static CalibrationBlob> {
        self.regions.iter().find(|blob| blob.address == address)
    }

    /// All regions in the store.
    #[must_use]
    pub fn regions(&self) -> &'static [CalibrationBlob] {
        self.regions
    }
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::DEFAULT
    }
}
