//! Static key-to-controller binding table.

use crate::types::Buttons;

/// Direction a key pushes the left stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Stick axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

impl Direction {
    /// Axis and sign of the deflection.
    #[inline]
    #[must_use]
    pub const fn axis_sign(self) -> (Axis, i32) {
        match self {
            Self::Up => (Axis::Y, 1),
            Self::Down => (Axis::Y, -1),
            Self::Left => (Axis::X, -1),
            Self::Right => (Axis::X, 1),
        }
    }
}

/// What a bound key drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingTarget {
    /// One button bit.
    Button(Buttons),
    /// Full deflection of the left stick.
    Stick(Direction),
}

/// One entry of a binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyBinding {
    /// Unshifted character of the key.
    pub symbol: char,
    pub target: BindingTarget,
}

impl KeyBinding {
    #[must_use]
    pub const fn button(symbol: char, button: Buttons) -> Self {
        Self {
            symbol,
            target: BindingTarget::Button(button),
        }
    }

    #[must_use]
    pub const fn stick(symbol: char, direction: Direction) -> Self {
        Self {
            symbol,
            target: BindingTarget::Stick(direction),
        }
    }
}

/// Default layout: face buttons on the right hand, WASD on the stick.
pub const DEFAULT_BINDINGS: &[KeyBinding] = &[
    KeyBinding::button('y', Buttons::Y),
    KeyBinding::button('x', Buttons::X),
    KeyBinding::button(' ', Buttons::B),
    KeyBinding::button('e', Buttons::A),
    KeyBinding::button('r', Buttons::R),
    KeyBinding::button('z', Buttons::ZR),
    KeyBinding::button('p', Buttons::PLUS),
    KeyBinding::button('q', Buttons::ZL),
    KeyBinding::stick('w', Direction::Up),
    KeyBinding::stick('s', Direction::Down),
    KeyBinding::stick('a', Direction::Left),
    KeyBinding::stick('d', Direction::Right),
];

/// Target bound to `symbol`, if any.
#[must_use]
pub fn lookup(table: &[KeyBinding], symbol: char) -> Option<BindingTarget> {
    table
        .iter()
        .find(|binding| binding.symbol == symbol)
        .map(|binding| binding.target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup() {
        assert_eq!(
            lookup(DEFAULT_BINDINGS, 'e'),
            Some(BindingTarget::Button(Buttons::A))
        );
        assert_eq!(
            lookup(DEFAULT_BINDINGS, ' '),
            Some(BindingTarget::Button(Buttons::B))
        );
        assert_eq!(
            lookup(DEFAULT_BINDINGS, 'w'),
            Some(BindingTarget::Stick(Direction::Up))
        );
        assert_eq!(lookup(DEFAULT_BINDINGS, 'k'), None);
    }

    #[test]
    fn test_symbols_are_unique() {
        for (i, a) in DEFAULT_BINDINGS.iter().enumerate() {
            for b in &DEFAULT_BINDINGS[i + 1..] {
                assert_ne!(a.symbol, b.symbol);
            }
        }
    }

    #[test]
    fn test_buttons_are_single_bits() {
        for binding in DEFAULT_BINDINGS {
            if let BindingTarget::Button(button) = binding.target {
                assert_eq!(button.0.count_ones(), 1);
            }
        }
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let (up_axis, up) = Direction::Up.axis_sign();
        let (down_axis, down) = Direction::Down.axis_sign();
        assert_eq!(up_axis, down_axis);
        assert_eq!(up + down, 0);
    }
}
