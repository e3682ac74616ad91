/// Raw channel message read from the MIDI input device, exactly as it came
/// off the wire: `(status, data1, data2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiInEvent {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}
