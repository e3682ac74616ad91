use egui::{ComboBox, Ui};

use crate::app::AppSettings;
use crate::core::midi::MidiSystem;

/// Device and behavior settings panel. Returns `true` from [`show`] when it
/// changed something the app should persist.
///
/// [`show`]: MidiConfigPanel::show
pub struct MidiConfigPanel {
    input_ports: Vec<String>,
    output_ports: Vec<String>,
    status_message: Option<String>,
}

impl MidiConfigPanel {
    pub fn new() -> Self {
        Self {
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            status_message: None,
        }
    }

    pub fn refresh_ports(&mut self, midi: &MidiSystem) {
        self.input_ports = midi.input.list_ports();
        self.output_ports = midi.output.list_ports();
    }

    pub fn show(&mut self, ui: &mut Ui, midi: &mut MidiSystem, settings: &mut AppSettings) -> bool {
        let mut changed = false;

        ui.heading("MIDI Settings");

        if let Some(msg) = &self.status_message {
            ui.label(msg);
            ui.separator();
        }

        if ui.button("Refresh Ports").clicked() {
            self.refresh_ports(midi);
        }

        ui.group(|ui| {
            ui.label("Input port:");
            let current = settings
                .input_port
                .clone()
                .unwrap_or_else(|| "(none)".to_string());
            ComboBox::new("midi_input_port", "")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(settings.input_port.is_none(), "(none)").clicked() {
                        midi.input.disconnect();
                        settings.input_port = None;
                        self.status_message = Some("MIDI input disconnected".to_string());
                        changed = true;
                    }
                    for port in &self.input_ports {
                        let selected = settings.input_port.as_deref() == Some(port.as_str());
                        if ui.selectable_label(selected, port).clicked() && !selected {
                            match midi.input.connect_to_port(port) {
                                Ok(()) => {
                                    self.status_message =
                                        Some(format!("Connected to input port: {port}"));
                                }
                                Err(err) => {
                                    self.status_message =
                                        Some(format!("Error connecting to input port: {err}"));
                                }
                            }
                            settings.input_port = Some(port.clone());
                            changed = true;
                        }
                    }
                });
        });

        ui.group(|ui| {
            ui.label("Output port:");
            let current = settings
                .output_port
                .clone()
                .unwrap_or_else(|| "(none)".to_string());
            ComboBox::new("midi_output_port", "")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(settings.output_port.is_none(), "(none)").clicked() {
                        midi.output.disconnect();
                        settings.output_port = None;
                        self.status_message = Some("MIDI output disconnected".to_string());
                        changed = true;
                    }
                    for port in &self.output_ports {
                        let selected = settings.output_port.as_deref() == Some(port.as_str());
                        if ui.selectable_label(selected, port).clicked() && !selected {
                            match midi.output.connect_to_port(port) {
                                Ok(()) => {
                                    self.status_message =
                                        Some(format!("Connected to output port: {port}"));
                                }
                                Err(err) => {
                                    self.status_message =
                                        Some(format!("Error connecting to output port: {err}"));
                                }
                            }
                            settings.output_port = Some(port.clone());
                            changed = true;
                        }
                    }
                });
        });

        ui.group(|ui| {
            ui.label("Options:");
            if ui
                .checkbox(
                    &mut settings.ignore_midi_errors,
                    "Keep running when a device fails to open",
                )
                .changed()
            {
                changed = true;
            }
            if ui
                .checkbox(
                    &mut settings.high_velocity_mode,
                    "Remap incoming velocities upward (v/2 + 64)",
                )
                .changed()
            {
                changed = true;
            }
        });

        ui.group(|ui| {
            ui.label("Octave window:");
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Slider::new(&mut settings.octave_start, 0..=9).text("First octave"))
                    .changed()
                {
                    changed = true;
                }
                if ui
                    .add(egui::Slider::new(&mut settings.octave_count, 1..=6).text("Octaves"))
                    .changed()
                {
                    changed = true;
                }
            });
        });

        changed
    }
}
