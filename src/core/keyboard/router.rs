//! Playback state and event routing.
//!
//! Every input goes through the [`EventRouter`], whether it is a keyboard
//! symbol, a pointer gesture on the widget, or a raw event from the MIDI
//! input device. The router mutates the playback state and returns the list
//! of [`Effect`]s the caller must execute. Nothing in here touches the
//! screen or a device, so the whole state machine runs under test without
//! a UI.

use std::collections::HashSet;

use super::bindings::{Binding, KeyBindings};
use super::layout::{HIGHEST_KEY, KEYS_PER_OCTAVE};

pub const DEFAULT_OCTAVE: u8 = 4;
pub const DEFAULT_VOLUME: u8 = 64;
const MAX_OCTAVE: u8 = 10;
const VOLUME_STEP: u8 = 10;
/// Largest value a MIDI data byte can carry.
const MAX_DATA_BYTE: u16 = 0x7F;

const STATUS_NOTE_ON: u8 = 144;
const STATUS_NOTE_OFF: u8 = 128;
const STATUS_CONTROL: u8 = 176;

/// Controller number for the sustain pedal.
pub const SUSTAIN_CONTROLLER: u8 = 64;

/// One outbound consequence of routing an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Send a note-on to the MIDI output.
    NoteOn { key: u8, velocity: u8 },
    /// Send a note-off to the MIDI output.
    NoteOff { key: u8, velocity: u8 },
    /// Send a sustain controller change to the MIDI output.
    Sustain { value: u8 },
    /// Color the on-screen key with the velocity hue.
    Highlight { key: u8, velocity: u8 },
    /// Restore the on-screen key to its base color.
    Restore { key: u8 },
}

/// Mutable playback state plus the routing rules that drive it.
pub struct EventRouter {
    bindings: KeyBindings,
    octave: u8,
    volume: u8,
    held: HashSet<char>,
    hovered_key: Option<u8>,
    high_velocity: bool,
}

impl EventRouter {
    pub fn new(high_velocity: bool) -> Self {
        Self {
            bindings: KeyBindings::default(),
            octave: DEFAULT_OCTAVE,
            volume: DEFAULT_VOLUME,
            held: HashSet::new(),
            hovered_key: None,
            high_velocity,
        }
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_high_velocity(&mut self, enabled: bool) {
        self.high_velocity = enabled;
    }

    /// A keyboard symbol went down. Repeated press notifications for a
    /// symbol that is already held are dropped here; OS auto-repeat is not
    /// something the toolkit is trusted to filter.
    pub fn symbol_pressed(&mut self, symbol: char) -> Vec<Effect> {
        let Some(binding) = self.bindings.resolve(symbol) else {
            return Vec::new();
        };
        match binding {
            Binding::Note(offset) => {
                if !self.held.insert(symbol) {
                    return Vec::new();
                }
                let key = self.octave as u16 * KEYS_PER_OCTAVE as u16 + offset as u16;
                key_change(key, true, self.volume)
            }
            _ => self.control(binding),
        }
    }

    /// A keyboard symbol came back up.
    pub fn symbol_released(&mut self, symbol: char) -> Vec<Effect> {
        match self.bindings.resolve(symbol) {
            Some(Binding::Note(offset)) => {
                if !self.held.remove(&symbol) {
                    return Vec::new();
                }
                let key = self.octave as u16 * KEYS_PER_OCTAVE as u16 + offset as u16;
                key_change(key, false, 0)
            }
            Some(Binding::Sustain) => vec![Effect::Sustain { value: 0 }],
            _ => Vec::new(),
        }
    }

    /// Apply a non-note binding. Also used by on-screen controls.
    pub fn control(&mut self, binding: Binding) -> Vec<Effect> {
        match binding {
            Binding::SetOctave(octave) => self.octave = octave.min(MAX_OCTAVE),
            Binding::OctaveUp => self.octave = (self.octave + 1).min(MAX_OCTAVE),
            Binding::OctaveDown => self.octave = self.octave.saturating_sub(1),
            // Asymmetric clamps: +10 caps at 117, -10 floors at 10.
            Binding::VolumeUp => self.volume = (self.volume + VOLUME_STEP).min(117),
            Binding::VolumeDown => self.volume = self.volume.saturating_sub(VOLUME_STEP).max(10),
            Binding::Sustain => return vec![Effect::Sustain { value: 127 }],
            Binding::Note(_) => {}
        }
        Vec::new()
    }

    /// Pointer went down on a rendered key.
    pub fn pointer_pressed(&mut self, key: u8) -> Vec<Effect> {
        self.hovered_key = Some(key);
        key_change(key as u16, true, self.volume)
    }

    /// Pointer moved while the button is held. Sliding onto a different key
    /// releases the old one and presses the new one (glissando); sliding off
    /// the keyboard releases without pressing anything.
    pub fn pointer_moved(&mut self, key: Option<u8>) -> Vec<Effect> {
        if key == self.hovered_key {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(old) = self.hovered_key {
            effects.extend(key_change(old as u16, false, 0));
        }
        self.hovered_key = key;
        if let Some(new) = key {
            effects.extend(key_change(new as u16, true, self.volume));
        }
        effects
    }

    /// Pointer button released.
    pub fn pointer_released(&mut self) -> Vec<Effect> {
        match self.hovered_key.take() {
            Some(key) => key_change(key as u16, false, 0),
            None => Vec::new(),
        }
    }

    /// A raw event arrived from the MIDI input device. Recognized statuses
    /// mirror input to output while driving the display; anything else is
    /// logged and discarded.
    pub fn midi_received(&mut self, status: u8, data1: u8, data2: u8) -> Vec<Effect> {
        match status {
            STATUS_NOTE_ON => {
                let velocity = if self.high_velocity {
                    data2 / 2 + 64
                } else {
                    data2
                };
                key_change(data1 as u16, true, velocity)
            }
            STATUS_NOTE_OFF => key_change(data1 as u16, false, data2),
            STATUS_CONTROL => vec![Effect::Sustain { value: data2 }],
            _ => {
                log::warn!("unknown MIDI event: ({status}, {data1}, {data2})");
                Vec::new()
            }
        }
    }
}

/// Common press/release path. Keys above the display range are not
/// recolored but are still forwarded to the output as long as they fit in a
/// MIDI data byte; keys that don't fit cannot go on the wire at all.
fn key_change(key: u16, pressed: bool, velocity: u8) -> Vec<Effect> {
    let mut effects = Vec::new();
    if key <= HIGHEST_KEY as u16 {
        let key = key as u8;
        effects.push(if pressed {
            Effect::Highlight { key, velocity }
        } else {
            Effect::Restore { key }
        });
    } else {
        log::warn!("key out of range: {key}");
    }
    if key <= MAX_DATA_BYTE {
        let key = key as u8;
        effects.push(if pressed {
            Effect::NoteOn { key, velocity }
        } else {
            Effect::NoteOff { key, velocity }
        });
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_ons(effects: &[Effect]) -> Vec<(u8, u8)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::NoteOn { key, velocity } => Some((*key, *velocity)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn press_emits_note_on_and_highlight() {
        let mut router = EventRouter::new(false);
        let effects = router.symbol_pressed('a');
        assert_eq!(
            effects,
            vec![
                Effect::Highlight { key: 48, velocity: DEFAULT_VOLUME },
                Effect::NoteOn { key: 48, velocity: DEFAULT_VOLUME },
            ]
        );
    }

    #[test]
    fn release_restores_base_color_and_sends_note_off() {
        let mut router = EventRouter::new(false);
        router.symbol_pressed('k');
        let effects = router.symbol_released('k');
        assert_eq!(
            effects,
            vec![
                Effect::Restore { key: 60 },
                Effect::NoteOff { key: 60, velocity: 0 },
            ]
        );
    }

    #[test]
    fn repeated_press_of_a_held_symbol_is_suppressed() {
        let mut router = EventRouter::new(false);
        assert!(!router.symbol_pressed('d').is_empty());
        assert!(router.symbol_pressed('d').is_empty());
        // Releasing still works once.
        assert!(!router.symbol_released('d').is_empty());
        assert!(router.symbol_released('d').is_empty());
    }

    #[test]
    fn set_octave_rebases_the_note_row() {
        let mut router = EventRouter::new(false);
        router.symbol_pressed('5');
        let effects = router.symbol_pressed('a');
        assert_eq!(note_ons(&effects), vec![(60, DEFAULT_VOLUME)]);
    }

    #[test]
    fn octave_steps_clamp() {
        let mut router = EventRouter::new(false);
        for _ in 0..20 {
            router.symbol_pressed('.');
        }
        assert_eq!(router.octave(), 10);
        for _ in 0..20 {
            router.symbol_pressed(',');
        }
        assert_eq!(router.octave(), 0);
    }

    #[test]
    fn volume_up_clamps_at_117() {
        let mut router = EventRouter::new(false);
        for _ in 0..12 {
            router.symbol_pressed('+');
        }
        assert_eq!(router.volume(), 117);
    }

    #[test]
    fn volume_down_clamps_at_10() {
        let mut router = EventRouter::new(false);
        for _ in 0..12 {
            router.symbol_pressed('-');
        }
        assert_eq!(router.volume(), 10);
        router.symbol_pressed('-');
        assert_eq!(router.volume(), 10);
    }

    #[test]
    fn sustain_sends_127_then_0_and_is_not_held() {
        let mut router = EventRouter::new(false);
        assert_eq!(router.symbol_pressed(' '), vec![Effect::Sustain { value: 127 }]);
        // Auto-repeat of the pedal symbol keeps sending, unlike notes.
        assert_eq!(router.symbol_pressed(' '), vec![Effect::Sustain { value: 127 }]);
        assert_eq!(router.symbol_released(' '), vec![Effect::Sustain { value: 0 }]);
    }

    #[test]
    fn glissando_pairs_note_events_exactly() {
        let mut router = EventRouter::new(false);
        let mut effects = Vec::new();
        effects.extend(router.pointer_pressed(50));
        effects.extend(router.pointer_moved(Some(50)));
        effects.extend(router.pointer_moved(Some(51)));
        effects.extend(router.pointer_moved(Some(52)));
        effects.extend(router.pointer_released());
        let notes: Vec<Effect> = effects
            .into_iter()
            .filter(|e| matches!(e, Effect::NoteOn { .. } | Effect::NoteOff { .. }))
            .collect();
        assert_eq!(
            notes,
            vec![
                Effect::NoteOn { key: 50, velocity: DEFAULT_VOLUME },
                Effect::NoteOff { key: 50, velocity: 0 },
                Effect::NoteOn { key: 51, velocity: DEFAULT_VOLUME },
                Effect::NoteOff { key: 51, velocity: 0 },
                Effect::NoteOn { key: 52, velocity: DEFAULT_VOLUME },
                Effect::NoteOff { key: 52, velocity: 0 },
            ]
        );
    }

    #[test]
    fn dragging_off_the_keyboard_releases_without_pressing() {
        let mut router = EventRouter::new(false);
        router.pointer_pressed(50);
        let effects = router.pointer_moved(None);
        assert_eq!(
            effects,
            vec![
                Effect::Restore { key: 50 },
                Effect::NoteOff { key: 50, velocity: 0 },
            ]
        );
        assert!(router.pointer_released().is_empty());
    }

    #[test]
    fn incoming_note_on_mirrors_to_output() {
        let mut router = EventRouter::new(false);
        let effects = router.midi_received(144, 60, 100);
        assert_eq!(
            effects,
            vec![
                Effect::Highlight { key: 60, velocity: 100 },
                Effect::NoteOn { key: 60, velocity: 100 },
            ]
        );
    }

    #[test]
    fn high_velocity_mode_remaps_incoming_velocity() {
        let mut router = EventRouter::new(true);
        let effects = router.midi_received(144, 60, 100);
        assert_eq!(note_ons(&effects), vec![(60, 114)]);
    }

    #[test]
    fn incoming_note_off_passes_release_velocity_through() {
        let mut router = EventRouter::new(false);
        let effects = router.midi_received(128, 60, 40);
        assert_eq!(
            effects,
            vec![
                Effect::Restore { key: 60 },
                Effect::NoteOff { key: 60, velocity: 40 },
            ]
        );
    }

    #[test]
    fn incoming_controller_is_forwarded_as_sustain() {
        let mut router = EventRouter::new(false);
        assert_eq!(
            router.midi_received(176, 64, 90),
            vec![Effect::Sustain { value: 90 }]
        );
    }

    #[test]
    fn unknown_status_is_discarded() {
        let mut router = EventRouter::new(false);
        assert!(router.midi_received(192, 0, 0).is_empty());
        assert!(router.midi_received(250, 1, 2).is_empty());
    }

    #[test]
    fn keys_above_display_range_forward_without_highlight() {
        let mut router = EventRouter::new(false);
        let effects = router.midi_received(144, 125, 80);
        assert_eq!(effects, vec![Effect::NoteOn { key: 125, velocity: 80 }]);
    }

    #[test]
    fn keys_past_the_data_byte_limit_are_dropped() {
        let mut router = EventRouter::new(false);
        router.symbol_pressed('9');
        router.symbol_pressed('.');
        // Octave 10, offset 16: key 136 can be neither displayed nor sent.
        assert!(router.symbol_pressed(';').is_empty());
    }
}
