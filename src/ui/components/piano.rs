use std::collections::HashMap;

use egui::ecolor::Hsva;
use egui::{Color32, Pos2, Rect, Response, Sense, Stroke, StrokeKind, Ui, Vec2};

use crate::core::keyboard::layout::{KeyRect, KeyboardLayout};

/// Pointer gesture reported by the widget, in key-id terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PianoEvent {
    Pressed(u8),
    DraggedTo(Option<u8>),
    Released,
}

/// On-screen piano keyboard. A pure projection of a [`KeyboardLayout`]: the
/// widget paints the layout's rectangles and maps pointer positions back to
/// key ids, leaving all playback state to the caller.
pub struct PianoKeyboard<'a> {
    layout: &'a KeyboardLayout,
    lit: &'a HashMap<u8, u8>,
}

impl<'a> PianoKeyboard<'a> {
    /// `lit` maps key id to the velocity it was pressed with.
    pub fn new(layout: &'a KeyboardLayout, lit: &'a HashMap<u8, u8>) -> Self {
        Self { layout, lit }
    }

    pub fn show(self, ui: &mut Ui) -> (Response, Option<PianoEvent>) {
        let desired_size = Vec2::new(self.layout.width(), self.layout.height());
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter_at(rect);
            let outline = Stroke::new(1.0, Color32::BLACK);
            // White keys first, black keys on top.
            for (key, key_rect) in self.layout.white_keys() {
                let screen = to_screen(rect.min, key_rect);
                painter.rect_filled(screen, 0.0, self.fill_color(key, Color32::WHITE));
                painter.rect_stroke(screen, 0.0, outline, StrokeKind::Inside);
            }
            for (key, key_rect) in self.layout.black_keys() {
                let screen = to_screen(rect.min, key_rect);
                painter.rect_filled(screen, 0.0, self.fill_color(key, Color32::BLACK));
                painter.rect_stroke(screen, 0.0, outline, StrokeKind::Inside);
            }
        }

        let event = if response.drag_started() {
            self.key_under_pointer(&response, rect).map(PianoEvent::Pressed)
        } else if response.dragged() {
            Some(PianoEvent::DraggedTo(self.key_under_pointer(&response, rect)))
        } else if response.drag_stopped() {
            Some(PianoEvent::Released)
        } else {
            None
        };

        (response, event)
    }

    fn fill_color(&self, key: u8, base: Color32) -> Color32 {
        match self.lit.get(&key) {
            Some(&velocity) => velocity_color(velocity),
            None => base,
        }
    }

    fn key_under_pointer(&self, response: &Response, rect: Rect) -> Option<u8> {
        let pos = response.interact_pointer_pos()?;
        self.layout.key_at(pos.x - rect.left(), pos.y - rect.top())
    }
}

fn to_screen(origin: Pos2, key_rect: KeyRect) -> Rect {
    Rect::from_min_max(
        Pos2::new(origin.x + key_rect.min_x, origin.y + key_rect.min_y),
        Pos2::new(origin.x + key_rect.max_x, origin.y + key_rect.max_y),
    )
}

/// Hue wheel position for a velocity, wrapped onto [0, 360).
fn velocity_hue(velocity: u8) -> f32 {
    (velocity as f32 * 360.0 / 128.0) % 360.0
}

/// Pressed-key fill derived from the note velocity.
fn velocity_color(velocity: u8) -> Color32 {
    Hsva::new(velocity_hue(velocity) / 360.0, 0.85, 0.95, 1.0).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_hue_stays_on_the_wheel() {
        for velocity in 0..=127u8 {
            let hue = velocity_hue(velocity);
            assert!((0.0..360.0).contains(&hue), "velocity {velocity} -> hue {hue}");
        }
    }

    #[test]
    fn distinct_velocities_get_distinct_hues() {
        assert_ne!(velocity_hue(10), velocity_hue(100));
        assert_ne!(velocity_color(10), velocity_color(100));
    }
}
