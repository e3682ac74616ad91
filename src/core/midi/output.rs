use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "Clavier MIDI Output";

/// Program selected right after the output opens: acoustic grand.
const DEFAULT_PROGRAM: u8 = 0;

/// Handles MIDI output to a connected device. With no device connected every
/// send is a silent no-op, so the keyboard keeps working as a local display.
pub struct MidiOutputHandler {
    connection: Option<MidiOutputConnection>,
}

impl MidiOutputHandler {
    pub fn new() -> Self {
        Self { connection: None }
    }

    /// List all available MIDI output ports.
    pub fn list_ports(&self) -> Vec<String> {
        let mut port_names = Vec::new();
        match MidiOutput::new(CLIENT_NAME) {
            Ok(midi_out) => {
                for port in midi_out.ports() {
                    if let Ok(name) = midi_out.port_name(&port) {
                        port_names.push(name);
                    }
                }
            }
            Err(err) => {
                log::error!("error initializing MIDI output: {err}");
            }
        }
        port_names
    }

    /// Connect to the output port with the given name and select the piano
    /// program on channel 0.
    pub fn connect_to_port(&mut self, port_name: &str) -> Result<(), String> {
        self.disconnect();

        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|err| format!("Failed to create MIDI output: {err}"))?;

        let port = midi_out
            .ports()
            .into_iter()
            .find(|port| {
                midi_out
                    .port_name(port)
                    .map(|name| name == port_name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| format!("MIDI output port '{port_name}' not found"))?;

        let connection = midi_out
            .connect(&port, "clavier-write-output")
            .map_err(|err| format!("Failed to connect to MIDI output port: {err}"))?;

        self.connection = Some(connection);
        log::info!("MIDI output connected: {port_name}");
        self.send_program_change(0, DEFAULT_PROGRAM)
    }

    /// Connect to the first available output port.
    pub fn connect_default(&mut self) -> Result<(), String> {
        let port_name = self
            .list_ports()
            .into_iter()
            .next()
            .ok_or_else(|| "no MIDI output ports available".to_string())?;
        self.connect_to_port(&port_name)
    }

    pub fn disconnect(&mut self) {
        self.connection = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), String> {
        self.send(&[0x90 | (channel & 0x0F), note, velocity])
    }

    pub fn send_note_off(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), String> {
        self.send(&[0x80 | (channel & 0x0F), note, velocity])
    }

    pub fn send_control_change(&mut self, channel: u8, control: u8, value: u8) -> Result<(), String> {
        self.send(&[0xB0 | (channel & 0x0F), control, value])
    }

    pub fn send_program_change(&mut self, channel: u8, program: u8) -> Result<(), String> {
        self.send(&[0xC0 | (channel & 0x0F), program])
    }

    fn send(&mut self, message: &[u8]) -> Result<(), String> {
        if let Some(conn) = &mut self.connection {
            conn.send(message)
                .map_err(|err| format!("Failed to send MIDI message: {err}"))?;
        }
        Ok(())
    }
}
