mod midi_config;

pub use midi_config::MidiConfigPanel;
