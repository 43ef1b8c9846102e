use crate::config::Settings;
use crate::input::{
    GilrsBackend, InputError, InputEvent, InputSys, Key, MouseButton, ObjectId, Point,
    ProgramEvent, Rect, WindowHost,
};
use crate::ui::widgets::{Control, Label, LineEdit, PushButton, ScrollList, Slider};
use crate::ui::Scrollable;
use eframe::egui;

// Indices into the control table
const TITLE: usize = 0;
const PREV: usize = 1;
const NEXT: usize = 2;
const STRENGTH: usize = 4;
const LENGTH: usize = 6;
const RUMBLE: usize = 7;
const STOP: usize = 8;
const STATUS: usize = 9;
const STATE: usize = 10;

const POINTS_PER_NOTCH: f32 = 40.0;
const LINES_PER_PAGE: f32 = 10.0;
const FONT_SIZE: f32 = 15.0;

type Input = InputSys<GilrsBackend, EguiHost>;

/// Window side of the input system: pointer queries and IME toggling through egui
pub struct EguiHost {
    ctx: egui::Context,
}

impl WindowHost for EguiHost {
    fn mouse_position(&self) -> Point {
        self.ctx
            .input(|i| i.pointer.latest_pos())
            .map(to_point)
            .unwrap_or_default()
    }

    fn set_text_input(&mut self, enabled: bool) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::IMEAllowed(enabled));
    }
}

pub struct JoyTestApp {
    settings: Settings,
    input: Option<Input>,
    controls: Vec<Control>,
    init_error: String,
}

impl JoyTestApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let host = EguiHost {
            ctx: cc.egui_ctx.clone(),
        };

        let (input, init_error) = match GilrsBackend::new() {
            Ok(backend) => (Some(InputSys::new(backend, host, &settings)), String::new()),
            Err(e) => {
                log::error!("Failed to initialize input backend: {}", e);
                (None, e.to_string())
            }
        };

        let mut app = Self {
            controls: build_controls(&settings),
            settings,
            input,
            init_error,
        };
        app.refresh_title();
        app
    }

    fn set_status(&mut self, text: impl Into<String>) {
        if let Some(Control::Label(label)) = self.controls.get_mut(STATUS) {
            label.text = text.into();
        }
    }

    fn take_click(&mut self, index: usize) -> bool {
        match self.controls.get_mut(index) {
            Some(Control::Button(button)) => button.take_click(),
            _ => false,
        }
    }

    fn rumble_params(&self) -> (f32, u32) {
        let strength = match self.controls.get(STRENGTH) {
            Some(Control::Slider(slider)) => slider.value(),
            _ => self.settings.rumble_strength,
        };
        let length = match self.controls.get(LENGTH) {
            Some(Control::Edit(edit)) => edit.text.parse().unwrap_or(self.settings.rumble_length_ms),
            _ => self.settings.rumble_length_ms,
        };
        (strength, length)
    }

    /// Feed backend and window events through the input system and collect its notifications
    fn pump(&mut self, ctx: &egui::Context) -> Vec<ProgramEvent> {
        let Some(sys) = self.input.as_mut() else {
            return Vec::new();
        };

        sys.poll_backend(&mut self.controls);

        let (events, dt) = ctx.input(|i| (i.events.clone(), i.stable_dt));
        for event in events.iter().filter_map(translate_event) {
            sys.handle_event(event, &mut self.controls);
        }

        sys.tick((dt * 1000.0).round() as u32);
        sys.drain_events()
    }

    fn on_program_event(&mut self, event: ProgramEvent) {
        match event {
            ProgramEvent::ControllersChanged { selection_changed } => {
                if selection_changed {
                    self.menu_switch();
                } else {
                    self.refresh_title();
                }
                let count = self.input.as_ref().map_or(0, |sys| sys.num_controllers());
                self.set_status(format!("{} controller(s) connected", count));
            }
            ProgramEvent::TestStopped => self.set_status("Rumble stopped"),
            ProgramEvent::Enter => self.start_rumble(),
            ProgramEvent::Escape => self.stop_rumble(),
            ProgramEvent::OpenNextJoystick
            | ProgramEvent::OpenPrevJoystick
            | ProgramEvent::OpenJoystick(_) => self.menu_switch(),
        }
    }

    fn start_rumble(&mut self) {
        let (strength, length) = self.rumble_params();
        let Some(sys) = self.input.as_mut() else {
            return;
        };
        if sys.start_rumble(strength, length) {
            self.set_status(format!(
                "Rumbling at {:.0}% for {} ms",
                strength * 100.0,
                length
            ));
        } else {
            self.set_status("Selected controller cannot rumble");
        }
    }

    fn stop_rumble(&mut self) {
        if let Some(sys) = self.input.as_mut() {
            sys.stop_rumble();
        }
    }

    /// The view now shows another device, so stale hover/drag/capture refs must go
    fn menu_switch(&mut self) {
        if let Some(sys) = self.input.as_mut() {
            sys.post_menu_switch(&mut self.controls);
        }
        if let Some(Control::List(list)) = self.controls.get_mut(STATE) {
            list.set_lines(Vec::new());
        }
        self.refresh_title();
    }

    fn process_buttons(&mut self) {
        if self.take_click(PREV) {
            if let Some(sys) = self.input.as_mut() {
                sys.prev_controller();
            }
            self.menu_switch();
        }
        if self.take_click(NEXT) {
            if let Some(sys) = self.input.as_mut() {
                sys.next_controller();
            }
            self.menu_switch();
        }
        if self.take_click(RUMBLE) {
            self.start_rumble();
        }
        if self.take_click(STOP) {
            self.stop_rumble();
        }
    }

    fn refresh_title(&mut self) {
        let title = match self.input.as_ref() {
            Some(sys) => match sys.joystick_name() {
                Ok(name) => format!(
                    "Controller {} of {}: {}",
                    sys.cur_index() + 1,
                    sys.num_controllers(),
                    name
                ),
                Err(_) => "No controller connected".to_string(),
            },
            None => "Input unavailable".to_string(),
        };
        if let Some(Control::Label(label)) = self.controls.get_mut(TITLE) {
            label.text = title;
        }
    }

    fn refresh_state(&mut self) {
        let lines = match self.input.as_ref() {
            Some(sys) => match state_lines(sys) {
                Ok(lines) => lines,
                Err(InputError::NoCurrentDevice) => vec!["Plug in a controller".to_string()],
                Err(e) => vec![e.to_string()],
            },
            None => Vec::new(),
        };
        if let Some(Control::List(list)) = self.controls.get_mut(STATE) {
            list.set_lines(lines);
        }
    }

    fn paint(&self, painter: &egui::Painter) {
        let visuals = painter.ctx().style().visuals.clone();
        let font = egui::FontId::proportional(FONT_SIZE);
        let text_color = visuals.text_color();
        let fill = visuals.widgets.inactive.bg_fill;
        let hover_fill = visuals.widgets.hovered.bg_fill;
        let accent = visuals.selection.bg_fill;

        for (index, control) in self.controls.iter().enumerate() {
            let hovered = self
                .input
                .as_ref()
                .is_some_and(|sys| sys.is_selected(ObjectId(index)));

            match control {
                Control::Label(label) => {
                    painter.text(
                        to_pos(label.rect.x, label.rect.y),
                        egui::Align2::LEFT_TOP,
                        &label.text,
                        font.clone(),
                        text_color,
                    );
                }
                Control::Button(button) => {
                    let rect = to_rect(button.rect);
                    painter.rect_filled(rect, 4.0, if hovered { hover_fill } else { fill });
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        &button.label,
                        font.clone(),
                        text_color,
                    );
                }
                Control::Edit(edit) => {
                    let rect = to_rect(edit.rect);
                    painter.rect_filled(rect, 2.0, visuals.extreme_bg_color);
                    let stroke = if edit.is_editing() {
                        egui::Stroke::new(1.5, accent)
                    } else {
                        visuals.widgets.inactive.bg_stroke
                    };
                    painter.rect_stroke(rect, 2.0, stroke, egui::StrokeKind::Inside);
                    let text = if edit.is_editing() {
                        format!("{}|", edit.text)
                    } else {
                        edit.text.clone()
                    };
                    painter.text(
                        rect.left_center() + egui::vec2(4.0, 0.0),
                        egui::Align2::LEFT_CENTER,
                        text,
                        font.clone(),
                        text_color,
                    );
                }
                Control::Slider(slider) => {
                    let track = to_rect(slider.rect);
                    painter.rect_filled(track.shrink2(egui::vec2(0.0, track.height() * 0.35)), 2.0, fill);
                    painter.rect_filled(to_rect(slider.thumb()), 3.0, if hovered { hover_fill } else { accent });
                }
                Control::List(list) => {
                    let area = to_rect(list.rect);
                    painter.rect_filled(area, 0.0, visuals.extreme_bg_color);
                    let clipped = painter.with_clip_rect(area);
                    for (row, line) in list.lines().iter().enumerate() {
                        let y = list.rect.y + row as i32 * list.line_height - list.scroll();
                        clipped.text(
                            to_pos(list.rect.x + 4, y),
                            egui::Align2::LEFT_TOP,
                            line,
                            font.clone(),
                            text_color,
                        );
                    }
                    painter.rect_filled(to_rect(list.bar()), 0.0, fill);
                    let bar = list.bar();
                    let thumb = Rect::new(bar.x, list.slider_y(), bar.w, list.slider_height());
                    painter.rect_filled(to_rect(thumb), 3.0, if hovered { hover_fill } else { accent });
                }
            }
        }
    }
}

impl eframe::App for JoyTestApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for event in self.pump(ctx) {
            self.on_program_event(event);
        }
        self.process_buttons();
        self.refresh_state();
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.input.is_none() {
                ui.heading("JoyTest");
                ui.label(
                    egui::RichText::new(format!("Controller support unavailable: {}", self.init_error))
                        .color(egui::Color32::RED),
                );
                return;
            }
            self.paint(ui.painter());
        });
    }
}

fn build_controls(settings: &Settings) -> Vec<Control> {
    let label = |x, y, w, text: &str| {
        Control::Label(Label {
            rect: Rect::new(x, y, w, 24),
            text: text.to_string(),
        })
    };

    vec![
        label(20, 12, 560, ""),
        Control::Button(PushButton::new(Rect::new(20, 44, 90, 28), "< Prev")),
        Control::Button(PushButton::new(Rect::new(120, 44, 90, 28), "Next >")),
        label(20, 88, 110, "Strength"),
        Control::Slider(Slider::new(Rect::new(140, 88, 300, 24), 24, settings.rumble_strength)),
        label(20, 122, 110, "Length (ms)"),
        Control::Edit(LineEdit::new(
            Rect::new(140, 122, 100, 24),
            &settings.rumble_length_ms.to_string(),
            true,
        )),
        Control::Button(PushButton::new(Rect::new(250, 120, 90, 28), "Rumble")),
        Control::Button(PushButton::new(Rect::new(350, 120, 90, 28), "Stop")),
        label(20, 158, 560, "Enter starts the rumble test, Escape stops it"),
        Control::List(ScrollList::new(Rect::new(20, 190, 560, 290), 18, 14)),
    ]
}

/// Text dump of the selected device, one reading per line
fn state_lines(sys: &Input) -> Result<Vec<String>, InputError> {
    let mut lines = vec![format!("Joystick: {}", sys.joystick_name()?)];
    lines.push(format!(
        "Buttons: {}  Axes: {}  Hats: {}",
        sys.num_jbuttons()?,
        sys.num_jaxes()?,
        sys.num_jhats()?
    ));

    let pressed = sys.joystick_buttons()?;
    lines.push(if pressed.is_empty() {
        "Pressed: none".to_string()
    } else {
        let list: Vec<String> = pressed.iter().map(|b| b.to_string()).collect();
        format!("Pressed: {}", list.join(" "))
    });
    for (index, value) in sys.joystick_axes()? {
        lines.push(format!("Axis {}: {}", index, value));
    }
    for (index, value) in sys.joystick_hats()? {
        lines.push(format!("Hat {}: {}", index, hat_name(value)));
    }

    if sys.is_gamepad()? {
        lines.push(format!("Gamepad: {}", sys.gamepad_name()?));
        let buttons: Vec<&str> = sys.gamepad_buttons()?.iter().map(|b| b.name()).collect();
        lines.push(format!("  Held: {}", buttons.join(" ")));
        for (axis, value) in sys.gamepad_axes()? {
            lines.push(format!("  {}: {}", axis.name(), value));
        }
    }

    lines.push(if !sys.is_haptic()? {
        "Rumble: not supported".to_string()
    } else if sys.is_rumbling() {
        format!("Rumble: running, {} ms left", sys.rumble_remaining())
    } else {
        "Rumble: supported".to_string()
    });
    Ok(lines)
}

fn hat_name(value: u8) -> &'static str {
    match value {
        0x00 => "centered",
        0x01 => "up",
        0x03 => "right-up",
        0x02 => "right",
        0x06 => "right-down",
        0x04 => "down",
        0x0c => "left-down",
        0x08 => "left",
        0x09 => "left-up",
        _ => "?",
    }
}

fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x.round() as i32, pos.y.round() as i32)
}

fn to_pos(x: i32, y: i32) -> egui::Pos2 {
    egui::pos2(x as f32, y as f32)
}

fn to_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(to_pos(rect.x, rect.y), egui::vec2(rect.w as f32, rect.h as f32))
}

fn translate_button(button: egui::PointerButton) -> MouseButton {
    match button {
        egui::PointerButton::Primary => MouseButton::Left,
        egui::PointerButton::Middle => MouseButton::Middle,
        egui::PointerButton::Secondary => MouseButton::Right,
        egui::PointerButton::Extra1 => MouseButton::Other(4),
        egui::PointerButton::Extra2 => MouseButton::Other(5),
    }
}

/// egui reports neither standalone modifier presses nor keypad origin, so the window
/// never produces `Key::RightGui`, `Key::Keypad(_)` or `Key::KeypadEnter`. The "Next >"
/// button stands in for the next-device key, and keypad digits and Enter arrive as their
/// main-row equivalents.
fn translate_key(key: egui::Key) -> Key {
    use egui::Key as K;
    match key {
        K::ArrowLeft => Key::Left,
        K::ArrowRight => Key::Right,
        K::ArrowUp => Key::Up,
        K::ArrowDown => Key::Down,
        K::Num0 => Key::Num(0),
        K::Num1 => Key::Num(1),
        K::Num2 => Key::Num(2),
        K::Num3 => Key::Num(3),
        K::Num4 => Key::Num(4),
        K::Num5 => Key::Num(5),
        K::Num6 => Key::Num(6),
        K::Num7 => Key::Num(7),
        K::Num8 => Key::Num(8),
        K::Num9 => Key::Num(9),
        K::Enter => Key::Return,
        K::Escape => Key::Escape,
        K::Backspace => Key::Backspace,
        K::Delete => Key::Delete,
        K::Home => Key::Home,
        K::End => Key::End,
        _ => Key::Other,
    }
}

/// egui delivers wheel deltas in points, lines or pages; the input system wants notches
fn wheel_notches(unit: egui::MouseWheelUnit, dy: f32) -> f32 {
    match unit {
        egui::MouseWheelUnit::Point => dy / POINTS_PER_NOTCH,
        egui::MouseWheelUnit::Line => dy,
        egui::MouseWheelUnit::Page => dy * LINES_PER_PAGE,
    }
}

fn translate_event(event: &egui::Event) -> Option<InputEvent> {
    match event {
        egui::Event::PointerMoved(pos) => Some(InputEvent::MouseMotion(to_point(*pos))),
        egui::Event::PointerButton {
            pos,
            button,
            pressed: true,
            ..
        } => Some(InputEvent::MouseButtonDown {
            button: translate_button(*button),
            pos: to_point(*pos),
        }),
        egui::Event::PointerButton {
            button,
            pressed: false,
            ..
        } => Some(InputEvent::MouseButtonUp {
            button: translate_button(*button),
        }),
        egui::Event::MouseWheel { unit, delta, .. } => {
            Some(InputEvent::MouseWheel(wheel_notches(*unit, delta.y)))
        }
        egui::Event::Key {
            key,
            pressed: true,
            repeat,
            ..
        } => Some(InputEvent::KeyDown {
            key: translate_key(*key),
            repeat: *repeat,
        }),
        egui::Event::Text(text) => Some(InputEvent::Text(text.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_table_matches_indices() {
        let controls = build_controls(&Settings::default());
        assert!(matches!(controls[TITLE], Control::Label(_)));
        assert!(matches!(controls[PREV], Control::Button(_)));
        assert!(matches!(controls[NEXT], Control::Button(_)));
        assert!(matches!(controls[STRENGTH], Control::Slider(_)));
        assert!(matches!(controls[LENGTH], Control::Edit(_)));
        assert!(matches!(controls[RUMBLE], Control::Button(_)));
        assert!(matches!(controls[STOP], Control::Button(_)));
        assert!(matches!(controls[STATUS], Control::Label(_)));
        assert!(matches!(controls[STATE], Control::List(_)));
    }

    #[test]
    fn digits_and_enter_translate() {
        assert_eq!(translate_key(egui::Key::Num1), Key::Num(1));
        assert_eq!(translate_key(egui::Key::Num0), Key::Num(0));
        assert_eq!(translate_key(egui::Key::Enter), Key::Return);
        assert_eq!(translate_key(egui::Key::F5), Key::Other);
    }

    #[test]
    fn main_row_digits_cover_every_device_ordinal() {
        assert_eq!(translate_key(egui::Key::Num1).device_ordinal(), Some(0));
        assert_eq!(translate_key(egui::Key::Num9).device_ordinal(), Some(8));
        assert_eq!(translate_key(egui::Key::Num0).device_ordinal(), Some(9));
        assert_eq!(translate_key(egui::Key::ArrowRight).device_ordinal(), None);
    }

    #[test]
    fn wheel_units_scale_to_notches() {
        assert_eq!(wheel_notches(egui::MouseWheelUnit::Line, 1.0), 1.0);
        assert_eq!(wheel_notches(egui::MouseWheelUnit::Point, -80.0), -2.0);
        assert_eq!(wheel_notches(egui::MouseWheelUnit::Page, 1.0), 10.0);
    }

    #[test]
    fn key_release_is_dropped() {
        let event = egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: false,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(translate_event(&event), None);
    }

    #[test]
    fn pointer_press_carries_position() {
        let event = egui::Event::PointerButton {
            pos: egui::pos2(10.4, 20.6),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(
            translate_event(&event),
            Some(InputEvent::MouseButtonDown {
                button: MouseButton::Left,
                pos: Point::new(10, 21),
            })
        );
    }

    #[test]
    fn diagonal_hats_have_names() {
        assert_eq!(hat_name(0x03), "right-up");
        assert_eq!(hat_name(0x0c), "left-down");
        assert_eq!(hat_name(0x00), "centered");
    }
}
