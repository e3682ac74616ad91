use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection};

use crate::messaging::MidiInEvent;

const CLIENT_NAME: &str = "Clavier MIDI Input";

/// Handles MIDI input from a connected device. The connection callback runs
/// on the driver's thread and only forwards the raw bytes; all
/// interpretation happens on the UI thread.
pub struct MidiInputHandler {
    connection: Option<MidiInputConnection<()>>,
    sender: Sender<MidiInEvent>,
}

impl MidiInputHandler {
    pub fn new(sender: Sender<MidiInEvent>) -> Self {
        Self { connection: None, sender }
    }

    /// List all available MIDI input ports.
    pub fn list_ports(&self) -> Vec<String> {
        let mut port_names = Vec::new();
        match MidiInput::new(CLIENT_NAME) {
            Ok(midi_in) => {
                for port in midi_in.ports() {
                    if let Ok(name) = midi_in.port_name(&port) {
                        port_names.push(name);
                    }
                }
            }
            Err(err) => {
                log::error!("error initializing MIDI input: {err}");
            }
        }
        port_names
    }

    /// Connect to the input port with the given name.
    pub fn connect_to_port(&mut self, port_name: &str) -> Result<(), String> {
        self.disconnect();

        let midi_in = MidiInput::new(CLIENT_NAME)
            .map_err(|err| format!("Failed to create MIDI input: {err}"))?;

        let port = midi_in
            .ports()
            .into_iter()
            .find(|port| {
                midi_in
                    .port_name(port)
                    .map(|name| name == port_name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| format!("MIDI input port '{port_name}' not found"))?;

        let sender = self.sender.clone();
        let connection = midi_in
            .connect(
                &port,
                "clavier-read-input",
                move |_stamp, message, _| {
                    if message.len() >= 3 {
                        sender
                            .send(MidiInEvent {
                                status: message[0],
                                data1: message[1],
                                data2: message[2],
                            })
                            .ok();
                    } else {
                        log::debug!("short MIDI message dropped: {message:?}");
                    }
                },
                (),
            )
            .map_err(|err| format!("Failed to connect to MIDI input port: {err}"))?;

        self.connection = Some(connection);
        log::info!("MIDI input connected: {port_name}");
        Ok(())
    }

    /// Connect to the first available input port.
    pub fn connect_default(&mut self) -> Result<(), String> {
        let port_name = self
            .list_ports()
            .into_iter()
            .next()
            .ok_or_else(|| "no MIDI input ports available".to_string())?;
        self.connect_to_port(&port_name)
    }

    pub fn disconnect(&mut self) {
        self.connection = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}
