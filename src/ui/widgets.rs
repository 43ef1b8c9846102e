use super::{Clickable, EditState, Editable, HorizontalSlider, Scrollable, UiObject, Widget};
use crate::input::{Key, Rect};

const MIN_THUMB_HEIGHT: i32 = 12;

#[derive(Debug, Clone)]
pub struct Label {
    pub rect: Rect,
    pub text: String,
}

impl UiObject for Label {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn widget(&mut self) -> Widget<'_> {
        Widget::Passive
    }
}

#[derive(Debug, Clone)]
pub struct PushButton {
    pub rect: Rect,
    pub label: String,
    clicked: bool,
}

impl PushButton {
    pub fn new(rect: Rect, label: &str) -> Self {
        Self {
            rect,
            label: label.to_string(),
            clicked: false,
        }
    }

    /// Was the button clicked since the last call?
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }
}

impl Clickable for PushButton {
    fn on_click(&mut self) {
        self.clicked = true;
    }
}

impl UiObject for PushButton {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn widget(&mut self) -> Widget<'_> {
        Widget::Button(self)
    }
}

/// Single-line text field. Escape restores the text it had when editing started.
#[derive(Debug, Clone)]
pub struct LineEdit {
    pub rect: Rect,
    pub text: String,
    /// Accept digits only
    pub numeric: bool,
    saved: String,
    editing: bool,
}

impl LineEdit {
    pub fn new(rect: Rect, text: &str, numeric: bool) -> Self {
        Self {
            rect,
            text: text.to_string(),
            numeric,
            saved: String::new(),
            editing: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }
}

impl Editable for LineEdit {
    fn on_click(&mut self) {
        self.saved = self.text.clone();
        self.editing = true;
    }

    fn on_keypress(&mut self, key: Key) -> EditState {
        match key {
            Key::Return | Key::KeypadEnter => {
                self.confirm();
                EditState::Confirmed
            }
            Key::Escape => {
                self.text = std::mem::take(&mut self.saved);
                self.editing = false;
                EditState::Cancelled
            }
            Key::Backspace => {
                self.text.pop();
                EditState::Editing
            }
            _ => EditState::Editing,
        }
    }

    fn on_text(&mut self, text: &str) {
        if !self.editing {
            return;
        }
        if self.numeric {
            self.text.extend(text.chars().filter(|c| c.is_ascii_digit()));
        } else {
            self.text.push_str(text);
        }
    }

    fn confirm(&mut self) {
        self.editing = false;
        self.saved.clear();
    }
}

impl UiObject for LineEdit {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn widget(&mut self) -> Widget<'_> {
        Widget::LineEdit(self)
    }
}

/// Horizontal slider with a fixed-width thumb
#[derive(Debug, Clone)]
pub struct Slider {
    pub rect: Rect,
    pub thumb_width: i32,
    /// Thumb offset from the left edge of `rect`
    pos: i32,
    drag_offset: i32,
}

impl Slider {
    pub fn new(rect: Rect, thumb_width: i32, value: f32) -> Self {
        let mut slider = Self {
            rect,
            thumb_width,
            pos: 0,
            drag_offset: 0,
        };
        slider.set_value(value);
        slider
    }

    fn travel(&self) -> i32 {
        (self.rect.w - self.thumb_width).max(0)
    }

    /// Thumb position as 0.0 (left) to 1.0 (right)
    pub fn value(&self) -> f32 {
        match self.travel() {
            0 => 0.0,
            travel => self.pos as f32 / travel as f32,
        }
    }

    pub fn set_value(&mut self, value: f32) {
        self.pos = (value.clamp(0.0, 1.0) * self.travel() as f32).round() as i32;
    }

    pub fn thumb(&self) -> Rect {
        Rect::new(self.slider_x(), self.rect.y, self.thumb_width, self.rect.h)
    }
}

impl HorizontalSlider for Slider {
    fn slider_x(&self) -> i32 {
        self.rect.x + self.pos
    }

    fn slider_width(&self) -> i32 {
        self.thumb_width
    }

    fn set_drag_offset(&mut self, offset: i32) {
        self.drag_offset = offset;
    }

    fn drag_slider(&mut self, x: i32) {
        self.pos = (x - self.drag_offset - self.rect.x).clamp(0, self.travel());
    }
}

impl UiObject for Slider {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn widget(&mut self) -> Widget<'_> {
        Widget::HorSlider(self)
    }
}

/// Vertically scrolling list of text lines with a scrollbar on the right
#[derive(Debug, Clone)]
pub struct ScrollList {
    pub rect: Rect,
    pub line_height: i32,
    pub bar_width: i32,
    lines: Vec<String>,
    scroll: i32,
    drag_offset: i32,
}

impl ScrollList {
    pub fn new(rect: Rect, line_height: i32, bar_width: i32) -> Self {
        Self {
            rect,
            line_height,
            bar_width,
            lines: Vec::new(),
            scroll: 0,
            drag_offset: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.scroll = self.scroll.clamp(0, self.max_scroll());
    }

    /// Content offset in pixels
    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    fn content_height(&self) -> i32 {
        self.lines.len() as i32 * self.line_height
    }

    fn max_scroll(&self) -> i32 {
        (self.content_height() - self.rect.h).max(0)
    }

    fn track_room(&self) -> i32 {
        self.rect.h - self.slider_height()
    }
}

impl Scrollable for ScrollList {
    fn bar(&self) -> Rect {
        Rect::new(
            self.rect.x + self.rect.w - self.bar_width,
            self.rect.y,
            self.bar_width,
            self.rect.h,
        )
    }

    fn slider_y(&self) -> i32 {
        let (max, room) = (self.max_scroll(), self.track_room());
        if max == 0 || room <= 0 {
            return self.rect.y;
        }
        self.rect.y + self.scroll * room / max
    }

    fn slider_height(&self) -> i32 {
        let content = self.content_height();
        if content <= self.rect.h {
            return self.rect.h;
        }
        (self.rect.h * self.rect.h / content).clamp(MIN_THUMB_HEIGHT.min(self.rect.h), self.rect.h)
    }

    fn set_drag_offset(&mut self, offset: i32) {
        self.drag_offset = offset;
    }

    fn drag_slider(&mut self, y: i32) {
        let room = self.track_room();
        if room <= 0 {
            return;
        }
        let top = (y - self.drag_offset - self.rect.y).clamp(0, room);
        self.scroll = top * self.max_scroll() / room;
    }

    fn scroll_list(&mut self, delta: i32) {
        self.scroll = (self.scroll + delta).clamp(0, self.max_scroll());
    }
}

impl UiObject for ScrollList {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn widget(&mut self) -> Widget<'_> {
        Widget::ScrollArea(self)
    }
}

/// Every widget the host can put on screen
#[derive(Debug, Clone)]
pub enum Control {
    Label(Label),
    Button(PushButton),
    Edit(LineEdit),
    Slider(Slider),
    List(ScrollList),
}

impl UiObject for Control {
    fn rect(&self) -> Rect {
        match self {
            Control::Label(w) => w.rect(),
            Control::Button(w) => w.rect(),
            Control::Edit(w) => w.rect(),
            Control::Slider(w) => w.rect(),
            Control::List(w) => w.rect(),
        }
    }

    fn widget(&mut self) -> Widget<'_> {
        match self {
            Control::Label(w) => w.widget(),
            Control::Button(w) => w.widget(),
            Control::Edit(w) => w.widget(),
            Control::Slider(w) => w.widget(),
            Control::List(w) => w.widget(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(n: usize) -> ScrollList {
        let mut list = ScrollList::new(Rect::new(0, 0, 100, 100), 10, 8);
        list.set_lines((0..n).map(|i| format!("line {}", i)).collect());
        list
    }

    #[test]
    fn slider_clamps_to_its_track() {
        let mut slider = Slider::new(Rect::new(10, 0, 110, 20), 10, 0.0);
        slider.drag_slider(-50);
        assert_eq!(slider.slider_x(), 10);
        slider.drag_slider(500);
        assert_eq!(slider.slider_x(), 110);
        assert_eq!(slider.value(), 1.0);
    }

    #[test]
    fn slider_value_round_trips_through_position() {
        let slider = Slider::new(Rect::new(0, 0, 120, 20), 20, 0.5);
        assert_eq!(slider.slider_x(), 50);
        assert!((slider.value() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn short_list_does_not_scroll() {
        let mut list = list_with(5);
        list.scroll_list(40);
        assert_eq!(list.scroll(), 0);
        assert_eq!(list.slider_height(), 100);
        assert_eq!(list.slider_y(), 0);
    }

    #[test]
    fn long_list_scrolls_within_bounds() {
        let mut list = list_with(40);
        list.scroll_list(1000);
        assert_eq!(list.scroll(), 300);
        list.scroll_list(-1000);
        assert_eq!(list.scroll(), 0);
        assert_eq!(list.slider_height(), 25);
    }

    #[test]
    fn dragging_list_thumb_to_bottom_reaches_end() {
        let mut list = list_with(40);
        list.drag_slider(75);
        assert_eq!(list.scroll(), 300);
        assert_eq!(list.slider_y(), 75);
    }

    #[test]
    fn shrinking_list_clamps_scroll() {
        let mut list = list_with(40);
        list.scroll_list(300);
        list.set_lines(vec!["only".to_string()]);
        assert_eq!(list.scroll(), 0);
    }

    #[test]
    fn escape_restores_text() {
        let mut edit = LineEdit::new(Rect::new(0, 0, 50, 20), "500", true);
        edit.on_click();
        edit.on_text("9x");
        assert_eq!(edit.text, "5009");
        assert_eq!(edit.on_keypress(Key::Escape), EditState::Cancelled);
        assert_eq!(edit.text, "500");
        assert!(!edit.is_editing());
    }

    #[test]
    fn text_is_ignored_when_not_editing() {
        let mut edit = LineEdit::new(Rect::new(0, 0, 50, 20), "abc", false);
        edit.on_text("d");
        assert_eq!(edit.text, "abc");
    }

    #[test]
    fn button_click_is_taken_once() {
        let mut button = PushButton::new(Rect::new(0, 0, 10, 10), "Go");
        button.on_click();
        assert!(button.take_click());
        assert!(!button.take_click());
    }
}
