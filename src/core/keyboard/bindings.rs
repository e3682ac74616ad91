//! Computer-keyboard bindings.
//!
//! The table is fixed: there is no config file to remap it, so the symbols
//! below are the compatibility contract for muscle memory. The home row
//! plays white keys and the row above plays black keys, spanning a bit more
//! than one octave so the neighbouring octave is reachable without
//! re-centering.

use std::collections::HashMap;

/// Action bound to one keyboard symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Semitone offset from the bottom of the current octave.
    Note(u8),
    /// Absolute jump to an octave.
    SetOctave(u8),
    OctaveUp,
    OctaveDown,
    VolumeUp,
    VolumeDown,
    Sustain,
}

/// Note symbols in offset order, offsets 0..=16.
const NOTE_SYMBOLS: [char; 17] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'z', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';',
];

const OCTAVE_UP: char = '.';
const OCTAVE_DOWN: char = ',';
const VOLUME_UP: char = '+';
const VOLUME_DOWN: char = '-';
const SUSTAIN: char = ' ';

/// Static symbol table, built once at startup.
pub struct KeyBindings {
    map: HashMap<char, Binding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        for (offset, &symbol) in NOTE_SYMBOLS.iter().enumerate() {
            map.insert(symbol, Binding::Note(offset as u8));
        }
        for digit in 0..=9u8 {
            map.insert((b'0' + digit) as char, Binding::SetOctave(digit));
        }
        map.insert(OCTAVE_UP, Binding::OctaveUp);
        map.insert(OCTAVE_DOWN, Binding::OctaveDown);
        map.insert(VOLUME_UP, Binding::VolumeUp);
        map.insert(VOLUME_DOWN, Binding::VolumeDown);
        map.insert(SUSTAIN, Binding::Sustain);
        Self { map }
    }
}

impl KeyBindings {
    pub fn resolve(&self, symbol: char) -> Option<Binding> {
        self.map.get(&symbol).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keyboard::layout::is_black_key;

    #[test]
    fn note_row_covers_offsets_0_to_16() {
        let bindings = KeyBindings::default();
        for (offset, &symbol) in NOTE_SYMBOLS.iter().enumerate() {
            assert_eq!(bindings.resolve(symbol), Some(Binding::Note(offset as u8)));
        }
    }

    #[test]
    fn home_row_is_white_top_row_is_black() {
        let bindings = KeyBindings::default();
        for symbol in ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';'] {
            match bindings.resolve(symbol) {
                Some(Binding::Note(offset)) => assert!(!is_black_key(offset)),
                other => panic!("{symbol:?} resolved to {other:?}"),
            }
        }
        for symbol in ['w', 'e', 't', 'z', 'u', 'o', 'p'] {
            match bindings.resolve(symbol) {
                Some(Binding::Note(offset)) => assert!(is_black_key(offset)),
                other => panic!("{symbol:?} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn digits_jump_to_their_octave() {
        let bindings = KeyBindings::default();
        for digit in 0..=9u8 {
            assert_eq!(
                bindings.resolve((b'0' + digit) as char),
                Some(Binding::SetOctave(digit))
            );
        }
    }

    #[test]
    fn control_symbols() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve('.'), Some(Binding::OctaveUp));
        assert_eq!(bindings.resolve(','), Some(Binding::OctaveDown));
        assert_eq!(bindings.resolve('+'), Some(Binding::VolumeUp));
        assert_eq!(bindings.resolve('-'), Some(Binding::VolumeDown));
        assert_eq!(bindings.resolve(' '), Some(Binding::Sustain));
    }

    #[test]
    fn unknown_symbols_have_no_binding() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve('q'), None);
        assert_eq!(bindings.resolve('ß'), None);
    }
}
