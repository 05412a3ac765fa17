//! InputTranslator: owns the controller state on the input side.

use procon_proto::{KeyReport, PointerReport};

use crate::config::TranslatorConfig;
use crate::keyboard::KeyEdgeTranslator;
use crate::pointer::PointerTranslator;
use crate::types::{ButtonSample, ControllerState};

/// One raw input from the upstream device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    Keyboard(KeyReport),
    Pointer(PointerReport),
    /// Directly polled buttons.
    Buttons(ButtonSample),
}

/// Routes input events to the key-edge and pointer translators.
///
/// The translator is the single owner of the input-side
/// [`ControllerState`]; the transport side only ever sees copies of it.
pub struct InputTranslator {
    state: ControllerState,
    keys: KeyEdgeTranslator,
    pointer: PointerTranslator,
}

impl InputTranslator {
    #[must_use]
    pub const fn new(config: &TranslatorConfig) -> Self {
        Self {
            state: ControllerState::neutral(),
            keys: KeyEdgeTranslator::new(config.bindings, config.stick_deflection),
            pointer: PointerTranslator::new(config.pointer),
        }
    }

    /// Apply an event and return the updated state.
    pub fn apply(&mut self, event: &InputEvent) -> ControllerState {
        match event {
            InputEvent::Keyboard(report) => {
                let edges = self.keys.apply(report, &mut self.state);
                if !edges.is_empty() {
                    trace!("key edges: {} down, {} up", edges.presses, edges.releases);
                }
            }
            InputEvent::Pointer(report) => {
                self.pointer.apply(report, &mut self.state);
            }
            InputEvent::Buttons(sample) => {
                self.state.buttons = self.state.buttons.merge(sample.value, sample.mask);
            }
        }
        self.state
    }

    /// Release every button and centre the stick.
    ///
    /// The pointer position is kept so the next report carries no
    /// spurious motion.
    pub fn release_all(&mut self) -> ControllerState {
        self.state = ControllerState {
            pointer: self.state.pointer,
            ..ControllerState::neutral()
        };
        self.keys.reset();
        self.pointer.reset();
        self.state
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(&TranslatorConfig::default())
    }
}
