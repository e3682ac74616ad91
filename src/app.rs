use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::core::keyboard::router::SUSTAIN_CONTROLLER;
use crate::core::keyboard::{Binding, Effect, EventRouter, KeyboardLayout};
use crate::core::midi::MidiSystem;
use crate::messaging::MessageBus;
use crate::ui::components::{PianoEvent, PianoKeyboard};
use crate::ui::panels::MidiConfigPanel;

/// Fixed canvas size of the keyboard.
const KEYBOARD_WIDTH: f32 = 1200.0;
const KEYBOARD_HEIGHT: f32 = 200.0;

/// Bounded per-frame read of queued MIDI input events.
const MAX_MIDI_EVENTS_PER_FRAME: usize = 10;
/// Poll tick used while an input device is connected.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything goes out on channel 0.
const MIDI_CHANNEL: u8 = 0;

// Main app state
pub struct KeyboardApp {
    settings: AppSettings,
    layout: KeyboardLayout,
    router: EventRouter,
    message_bus: MessageBus,
    midi: MidiSystem,
    panel: MidiConfigPanel,
    lit_keys: HashMap<u8, u8>,
    current_tab: Tab,
    last_midi_message: Option<String>,
    should_exit: bool,
}

#[derive(PartialEq)]
enum Tab {
    Keyboard,
    Midi,
}

impl eframe::App for KeyboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain the input-device queue, then the toolkit's key events; both
        // mutate playback state here on the UI thread only.
        self.process_midi_input();
        self.process_key_events(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Clavier");
                ui.label("🎹");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("❌ Exit").clicked() {
                        self.should_exit = true;
                    }
                });
            });

            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Keyboard, "Keyboard");
                ui.selectable_value(&mut self.current_tab, Tab::Midi, "MIDI Settings");
            });

            ui.separator();

            match self.current_tab {
                Tab::Keyboard => self.render_keyboard_tab(ui),
                Tab::Midi => self.render_midi_tab(ui),
            }
        });

        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // With no input device there is nothing to poll, so stay purely
        // event-driven instead of waking up every tick.
        if self.midi.input.is_connected() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

impl KeyboardApp {
    pub fn new() -> Result<Self> {
        let settings = Self::load_settings().unwrap_or_default();

        let message_bus = MessageBus::new();
        let mut midi = MidiSystem::new(message_bus.sender());

        log::info!("MIDI input ports: {:?}", midi.input.list_ports());
        log::info!("MIDI output ports: {:?}", midi.output.list_ports());

        midi.connect(
            settings.input_port.as_deref(),
            settings.output_port.as_deref(),
            settings.ignore_midi_errors,
        )
        .map_err(|err| anyhow::anyhow!("failed to open MIDI devices: {err}"))?;

        let layout = Self::build_layout(&settings);
        let router = EventRouter::new(settings.high_velocity_mode);
        let mut panel = MidiConfigPanel::new();
        panel.refresh_ports(&midi);

        Ok(KeyboardApp {
            settings,
            layout,
            router,
            message_bus,
            midi,
            panel,
            lit_keys: HashMap::new(),
            current_tab: Tab::Keyboard,
            last_midi_message: None,
            should_exit: false,
        })
    }

    fn build_layout(settings: &AppSettings) -> KeyboardLayout {
        // Keep the whole window inside the displayable key range.
        let start = settings.octave_start.min(9);
        let count = settings.octave_count.clamp(1, 10 - start);
        KeyboardLayout::new(start, count, KEYBOARD_WIDTH, KEYBOARD_HEIGHT)
    }

    fn process_midi_input(&mut self) {
        for _ in 0..MAX_MIDI_EVENTS_PER_FRAME {
            let Ok(event) = self.message_bus.try_receive() else {
                break;
            };
            self.last_midi_message = Some(format!(
                "({}, {}, {})",
                event.status, event.data1, event.data2
            ));
            let effects = self.router.midi_received(event.status, event.data1, event.data2);
            self.apply_effects(effects);
        }
    }

    fn process_key_events(&mut self, ctx: &egui::Context) {
        let key_events: Vec<(egui::Key, bool)> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed, .. } => Some((*key, *pressed)),
                    _ => None,
                })
                .collect()
        });

        for (key, pressed) in key_events {
            let Some(symbol) = key_symbol(key) else { continue };
            let effects = if pressed {
                self.router.symbol_pressed(symbol)
            } else {
                self.router.symbol_released(symbol)
            };
            self.apply_effects(effects);
        }
    }

    /// Execute router effects against the output device and the display map.
    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let result = match effect {
                Effect::NoteOn { key, velocity } => {
                    self.midi.output.send_note_on(MIDI_CHANNEL, key, velocity)
                }
                Effect::NoteOff { key, velocity } => {
                    self.midi.output.send_note_off(MIDI_CHANNEL, key, velocity)
                }
                Effect::Sustain { value } => {
                    self.midi
                        .output
                        .send_control_change(MIDI_CHANNEL, SUSTAIN_CONTROLLER, value)
                }
                Effect::Highlight { key, velocity } => {
                    self.lit_keys.insert(key, velocity);
                    Ok(())
                }
                Effect::Restore { key } => {
                    self.lit_keys.remove(&key);
                    Ok(())
                }
            };
            if let Err(err) = result {
                log::error!("MIDI send failed: {err}");
            }
        }
    }

    fn render_keyboard_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Octave −").clicked() {
                self.router.control(Binding::OctaveDown);
            }
            ui.label(format!("Octave: {}", self.router.octave()));
            if ui.button("Octave +").clicked() {
                self.router.control(Binding::OctaveUp);
            }

            ui.separator();

            if ui.button("Volume −").clicked() {
                self.router.control(Binding::VolumeDown);
            }
            ui.label(format!("Volume: {}", self.router.volume()));
            if ui.button("Volume +").clicked() {
                self.router.control(Binding::VolumeUp);
            }
        });

        ui.add_space(8.0);

        let (_, event) = PianoKeyboard::new(&self.layout, &self.lit_keys).show(ui);
        if let Some(event) = event {
            let effects = match event {
                PianoEvent::Pressed(key) => self.router.pointer_pressed(key),
                PianoEvent::DraggedTo(key) => self.router.pointer_moved(key),
                PianoEvent::Released => self.router.pointer_released(),
            };
            self.apply_effects(effects);
        }
    }

    fn render_midi_tab(&mut self, ui: &mut egui::Ui) {
        if self.panel.show(ui, &mut self.midi, &mut self.settings) {
            self.router.set_high_velocity(self.settings.high_velocity_mode);
            self.layout = Self::build_layout(&self.settings);
            if let Err(err) = self.save_settings() {
                log::error!("failed to save settings: {err}");
            }
        }

        ui.separator();
        match &self.last_midi_message {
            Some(msg) => ui.label(format!("Last MIDI message: {msg}")),
            None => ui.label("No MIDI messages received yet"),
        };
    }

    fn save_settings(&self) -> Result<()> {
        let settings_dir = Self::get_settings_dir()?;
        fs::create_dir_all(&settings_dir)?;

        let file = File::create(settings_dir.join("settings.json"))?;
        serde_json::to_writer_pretty(file, &self.settings)?;
        Ok(())
    }

    fn load_settings() -> Result<AppSettings> {
        let path = Self::get_settings_dir()?.join("settings.json");
        if path.exists() {
            let file = File::open(path)?;
            Ok(serde_json::from_reader(file)?)
        } else {
            Ok(AppSettings::default())
        }
    }

    fn get_settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push("clavier");
        Ok(path)
    }
}

/// Translate a toolkit key to the binding table's symbol. The note row
/// uses `z` rather than `y` for the G# position, so the table suits QWERTZ
/// muscle memory.
fn key_symbol(key: egui::Key) -> Option<char> {
    use egui::Key;
    Some(match key {
        Key::A => 'a',
        Key::W => 'w',
        Key::S => 's',
        Key::E => 'e',
        Key::D => 'd',
        Key::F => 'f',
        Key::T => 't',
        Key::G => 'g',
        Key::Z => 'z',
        Key::H => 'h',
        Key::U => 'u',
        Key::J => 'j',
        Key::K => 'k',
        Key::O => 'o',
        Key::L => 'l',
        Key::P => 'p',
        Key::Semicolon => ';',
        Key::Num0 => '0',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::Space => ' ',
        Key::Period => '.',
        Key::Comma => ',',
        Key::Minus => '-',
        Key::Plus | Key::Equals => '+',
        _ => return None,
    })
}

// App settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub input_port: Option<String>,
    pub output_port: Option<String>,
    pub ignore_midi_errors: bool,
    pub high_velocity_mode: bool,
    pub octave_start: u8,
    pub octave_count: u8,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            input_port: None,
            output_port: None,
            ignore_midi_errors: true,
            high_velocity_mode: false,
            octave_start: 3,
            octave_count: 4,
        }
    }
}
