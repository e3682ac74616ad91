mod piano;

pub use piano::{PianoEvent, PianoKeyboard};
