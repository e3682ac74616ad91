mod input;
mod output;

pub use input::MidiInputHandler;
pub use output::MidiOutputHandler;

use crossbeam_channel::Sender;

use crate::messaging::MidiInEvent;

/// Both halves of the MIDI transport.
pub struct MidiSystem {
    pub input: MidiInputHandler,
    pub output: MidiOutputHandler,
}

impl MidiSystem {
    pub fn new(sender: Sender<MidiInEvent>) -> Self {
        Self {
            input: MidiInputHandler::new(sender),
            output: MidiOutputHandler::new(),
        }
    }

    /// Open the configured devices. A named port is looked up exactly; with
    /// no name the first available port is used. When `ignore_errors` is set
    /// an open failure leaves that half disconnected for the rest of the run
    /// instead of failing startup.
    pub fn connect(
        &mut self,
        input_port: Option<&str>,
        output_port: Option<&str>,
        ignore_errors: bool,
    ) -> Result<(), String> {
        let input_result = match input_port {
            Some(name) => self.input.connect_to_port(name),
            None => self.input.connect_default(),
        };
        if let Err(err) = input_result {
            if ignore_errors {
                log::warn!("MIDI input unavailable: {err}");
            } else {
                return Err(err);
            }
        }

        let output_result = match output_port {
            Some(name) => self.output.connect_to_port(name),
            None => self.output.connect_default(),
        };
        if let Err(err) = output_result {
            if ignore_errors {
                log::warn!("MIDI output unavailable: {err}");
            } else {
                return Err(err);
            }
        }

        Ok(())
    }
}
