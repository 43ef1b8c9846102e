//! Capability interfaces the input coordinator drives.
//!
//! Objects live in a caller-owned table and are referenced by [`ObjectId`](crate::input::ObjectId).
//! Each object reports its bounds for hit testing and exposes at most one capability
//! through [`UiObject::widget`].

pub mod widgets;

use crate::input::{Key, Rect};

pub trait UiObject {
    fn rect(&self) -> Rect;
    fn widget(&mut self) -> Widget<'_>;
}

pub enum Widget<'a> {
    Button(&'a mut dyn Clickable),
    LineEdit(&'a mut dyn Editable),
    HorSlider(&'a mut dyn HorizontalSlider),
    ScrollArea(&'a mut dyn Scrollable),
    /// Hoverable but not interactive
    Passive,
}

pub trait Clickable {
    fn on_click(&mut self);
}

/// Result of forwarding a key to a captured editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Editing,
    Confirmed,
    Cancelled,
}

pub trait Editable {
    /// Start editing; the coordinator captures keyboard input afterwards
    fn on_click(&mut self);
    fn on_keypress(&mut self, key: Key) -> EditState;
    fn on_text(&mut self, text: &str);
    /// Commit the current content
    fn confirm(&mut self);
}

pub trait HorizontalSlider {
    /// Left edge of the thumb in window coordinates
    fn slider_x(&self) -> i32;
    fn slider_width(&self) -> i32;
    fn set_drag_offset(&mut self, offset: i32);
    /// Move the thumb so its left edge lands at `x` minus the drag offset
    fn drag_slider(&mut self, x: i32);
}

pub trait Scrollable {
    /// Scrollbar track
    fn bar(&self) -> Rect;
    /// Top edge of the thumb in window coordinates
    fn slider_y(&self) -> i32;
    fn slider_height(&self) -> i32;
    fn set_drag_offset(&mut self, offset: i32);
    fn drag_slider(&mut self, y: i32);
    fn scroll_list(&mut self, delta: i32);
}
