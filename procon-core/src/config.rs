//! Compile-time configuration.
//!
//! Every knob is a `const` struct with a `DEFAULT_*` value; firmware picks
//! or builds its own at compile time.

use fixed::types::I48F16;
use fixed_macro::fixed;
use procon_proto::hid::POINTER_BUTTON_PRIMARY;
use procon_proto::CalibrationStore;

use crate::binding::{KeyBinding, DEFAULT_BINDINGS};
use crate::dispatcher::UnknownAddressPolicy;
use crate::types::Buttons;

/// Pointer-to-motion mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerConfig {
    /// Negate X motion before accumulating.
    pub invert_x: bool,
    /// Negate Y motion before accumulating.
    pub invert_y: bool,
    /// Per-count X scale.
    pub x_scale: I48F16,
    /// Per-count Y scale.
    pub y_scale: I48F16,
    /// Controller button driven by the pointer button.
    pub button: Buttons,
    /// Pointer button bit(s) that press [`Self::button`].
    pub button_mask: u8,
}

/// Horizontal aim mirrored, vertical slowed down, primary click fires.
pub const DEFAULT_POINTER: PointerConfig = PointerConfig {
    invert_x: true,
    invert_y: false,
    x_scale: fixed!(1: I48F16),
    y_scale: fixed!(0.1: I48F16),
    button: Buttons::ZR,
    button_mask: POINTER_BUTTON_PRIMARY,
};

/// Input-side configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub bindings: &'static [KeyBinding],
    /// Axis offset applied per stick key press.
    pub stick_deflection: i32,
    pub pointer: PointerConfig,
}

pub const DEFAULT_TRANSLATOR: TranslatorConfig = TranslatorConfig {
    bindings: DEFAULT_BINDINGS,
    stick_deflection: 2047,
    pointer: DEFAULT_POINTER,
};

/// Transport-side configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Standard report period.
    pub tick_period_ms: u64,
    /// Reply to SPI reads of unknown addresses.
    pub unknown_address: UnknownAddressPolicy,
    pub calibration: CalibrationStore,
}

pub const DEFAULT_ENGINE: EngineConfig = EngineConfig {
    tick_period_ms: 30,
    unknown_address: UnknownAddressPolicy::Silent,
    calibration: CalibrationStore::DEFAULT,
};

impl Default for PointerConfig {
    fn default() -> Self {
        DEFAULT_POINTER
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        DEFAULT_TRANSLATOR
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        DEFAULT_ENGINE
    }
}
