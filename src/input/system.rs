use super::{
    DeviceBackend, DeviceHandle, DeviceId, GamepadAxis, GamepadButton, InputError, InputEvent,
    Key, MouseButton, ObjectId, Point, ProgramEvent, WindowHost,
};
use crate::config::Settings;
use crate::ui::{EditState, HorizontalSlider, Scrollable, UiObject, Widget};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// Owns the open devices and translates raw input into UI actions and program events.
///
/// Devices are kept ordered by id so next/previous/ordinal selection is stable.
/// Hover, drag and capture targets are indices into whatever object table the caller
/// passes in; they are reset on menu switch and drag end, and checked on every use.
pub struct InputSys<B: DeviceBackend, W: WindowHost> {
    backend: B,
    host: W,
    controllers: BTreeMap<DeviceId, DeviceHandle<B>>,
    cur_device: Option<DeviceId>,

    mouse_over: Option<ObjectId>,
    scroll_hold: Option<ObjectId>,
    captured: Option<ObjectId>,

    /// Milliseconds of rumble left, 0 when idle
    cur_rumbling: u32,
    scroll_factor: f32,

    events: Vec<ProgramEvent>,
}

impl<B: DeviceBackend, W: WindowHost> InputSys<B, W> {
    pub fn new(mut backend: B, host: W, settings: &Settings) -> Self {
        let mut controllers = BTreeMap::new();
        for index in 0..backend.num_joysticks() {
            match DeviceHandle::open(&mut backend, index) {
                Ok(dev) => {
                    if let Some(stale) = controllers.insert(dev.id(), dev) {
                        stale.close(&mut backend);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        let cur_device = controllers.keys().next().copied();
        log::info!("Found {} input device(s)", controllers.len());

        let mut sys = Self {
            backend,
            host,
            controllers,
            cur_device,
            mouse_over: None,
            scroll_hold: None,
            captured: None,
            cur_rumbling: 0,
            scroll_factor: settings.scroll_factor,
            events: Vec::new(),
        };
        sys.set_capture(None);
        sys
    }

    pub fn handle_event<O: UiObject>(&mut self, event: InputEvent, objects: &mut [O]) {
        match event {
            InputEvent::MouseMotion(pos) => self.mouse_motion(pos, objects),
            InputEvent::MouseButtonDown { button, pos } => {
                self.mouse_button_down(button, pos, objects)
            }
            InputEvent::MouseButtonUp { button } => self.mouse_button_up(button, objects),
            InputEvent::MouseWheel(dy) => self.mouse_wheel(dy, objects),
            InputEvent::KeyDown { key, repeat } => self.keypress(key, repeat, objects),
            InputEvent::Text(text) => self.text_input(&text, objects),
            InputEvent::ControllerAdded(index) => self.add_controller(index),
            InputEvent::ControllerRemoved(id) => self.del_controller(id),
        }
    }

    /// Apply every pending hot-plug change, one at a time
    pub fn poll_backend<O: UiObject>(&mut self, objects: &mut [O]) {
        while let Some(event) = self.backend.poll_event() {
            self.handle_event(event, objects);
        }
    }

    pub fn mouse_motion<O: UiObject>(&mut self, pos: Point, objects: &mut [O]) {
        if let Some(hold) = self.scroll_hold {
            match objects.get_mut(hold.0).map(|obj| obj.widget()) {
                Some(Widget::HorSlider(slider)) => slider.drag_slider(pos.x),
                Some(Widget::ScrollArea(area)) => area.drag_slider(pos.y),
                _ => {
                    log::debug!("Drag target {:?} is no longer draggable", hold);
                    self.scroll_hold = None;
                }
            }
        } else if let Some(index) = objects.iter().position(|obj| obj.rect().contains(pos)) {
            // Empty space keeps the previous hover target
            self.mouse_over = Some(ObjectId(index));
        }
    }

    pub fn mouse_button_down<O: UiObject>(
        &mut self,
        button: MouseButton,
        pos: Point,
        objects: &mut [O],
    ) {
        self.confirm_capture(objects);
        if button != MouseButton::Left {
            return;
        }
        let Some(over) = self.mouse_over else {
            return;
        };
        let Some(obj) = objects.get_mut(over.0) else {
            return;
        };

        match obj.widget() {
            Widget::Button(but) => but.on_click(),
            Widget::LineEdit(edit) => {
                edit.on_click();
                self.set_capture(Some(over));
            }
            Widget::HorSlider(slider) => self.check_slider_click(over, slider, pos.x),
            Widget::ScrollArea(area) => self.check_area_click(over, area, pos),
            Widget::Passive => {}
        }
    }

    fn check_slider_click(&mut self, id: ObjectId, slider: &mut dyn HorizontalSlider, mx: i32) {
        self.scroll_hold = Some(id);
        // A menu switch can drop a drag without a release
        slider.set_drag_offset(0);
        let (x, w) = (slider.slider_x(), slider.slider_width());
        if mx < x || mx >= x + w {
            slider.drag_slider(mx - w / 2);
        }
        slider.set_drag_offset(mx - slider.slider_x());
        log::debug!("Dragging slider {:?}", id);
    }

    fn check_area_click(&mut self, id: ObjectId, area: &mut dyn Scrollable, pos: Point) {
        if !area.bar().contains(pos) {
            return;
        }
        self.scroll_hold = Some(id);
        area.set_drag_offset(0);
        let (y, h) = (area.slider_y(), area.slider_height());
        if pos.y < y || pos.y >= y + h {
            area.drag_slider(pos.y - h / 2);
        }
        area.set_drag_offset(pos.y - area.slider_y());
        log::debug!("Dragging scroll area {:?}", id);
    }

    pub fn mouse_button_up<O: UiObject>(&mut self, button: MouseButton, objects: &mut [O]) {
        if button != MouseButton::Left {
            return;
        }
        let Some(hold) = self.scroll_hold.take() else {
            return;
        };
        match objects.get_mut(hold.0).map(|obj| obj.widget()) {
            Some(Widget::HorSlider(slider)) => slider.set_drag_offset(0),
            Some(Widget::ScrollArea(area)) => area.set_drag_offset(0),
            _ => {}
        }
        self.simulate_mouse_move(objects);
    }

    pub fn mouse_wheel<O: UiObject>(&mut self, dy: f32, objects: &mut [O]) {
        let Some(over) = self.mouse_over else {
            return;
        };
        if let Some(Widget::ScrollArea(area)) = objects.get_mut(over.0).map(|obj| obj.widget()) {
            area.scroll_list((dy * -self.scroll_factor) as i32);
        }
    }

    pub fn keypress<O: UiObject>(&mut self, key: Key, repeat: bool, objects: &mut [O]) {
        if let Some(id) = self.captured {
            let state = match objects.get_mut(id.0).map(|obj| obj.widget()) {
                Some(Widget::LineEdit(edit)) => edit.on_keypress(key),
                _ => {
                    log::debug!("Capture target {:?} is gone", id);
                    EditState::Cancelled
                }
            };
            if state != EditState::Editing {
                self.set_capture(None);
            }
            return;
        }
        if repeat {
            return;
        }

        match key {
            Key::Left => {
                if self.cur_device.is_some() {
                    self.prev_controller();
                    self.events.push(ProgramEvent::OpenPrevJoystick);
                }
            }
            Key::RightGui => {
                if self.cur_device.is_some() {
                    self.next_controller();
                    self.events.push(ProgramEvent::OpenNextJoystick);
                }
            }
            Key::Num(_) | Key::Keypad(_) => {
                if let Some(i) = key.device_ordinal().filter(|i| *i < self.controllers.len()) {
                    self.find_controller(i);
                    self.events.push(ProgramEvent::OpenJoystick(i));
                }
            }
            Key::Return | Key::KeypadEnter => self.events.push(ProgramEvent::Enter),
            Key::Escape => self.events.push(ProgramEvent::Escape),
            _ => {}
        }
    }

    pub fn text_input<O: UiObject>(&mut self, text: &str, objects: &mut [O]) {
        let Some(id) = self.captured else {
            log::debug!("Dropping text input without a capture target");
            return;
        };
        if let Some(Widget::LineEdit(edit)) = objects.get_mut(id.0).map(|obj| obj.widget()) {
            edit.on_text(text);
        }
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.cur_rumbling == 0 {
            return;
        }
        match self.cur_rumbling.checked_sub(elapsed_ms) {
            Some(left) if left > 0 => self.cur_rumbling = left,
            _ => {
                self.cur_rumbling = 0;
                self.events.push(ProgramEvent::TestStopped);
            }
        }
    }

    pub fn next_controller(&mut self) {
        let Some(cur) = self.cur_device else {
            return;
        };
        self.cur_device = self
            .controllers
            .range((Excluded(cur), Unbounded))
            .next()
            .or_else(|| self.controllers.iter().next())
            .map(|(id, _)| *id);
    }

    pub fn prev_controller(&mut self) {
        let Some(cur) = self.cur_device else {
            return;
        };
        self.cur_device = self
            .controllers
            .range(..cur)
            .next_back()
            .or_else(|| self.controllers.iter().next_back())
            .map(|(id, _)| *id);
    }

    pub fn find_controller(&mut self, i: usize) {
        if let Some(id) = self.controllers.keys().nth(i) {
            self.cur_device = Some(*id);
        }
    }

    /// Returns false when the current device can't rumble; nothing changes then
    pub fn start_rumble(&mut self, strength: f32, length_ms: u32) -> bool {
        let Some(dev) = self.cur_device.and_then(|id| self.controllers.get_mut(&id)) else {
            log::warn!("Rumble requested without a selected device");
            return false;
        };
        let id = dev.id();
        let Some(haptic) = dev.haptic_mut() else {
            log::info!("Device {} has no haptic support", id);
            return false;
        };

        match self.backend.rumble_play(haptic, strength, length_ms) {
            Ok(()) => {
                log::info!("Rumble on device {} at {:.2} for {} ms", id, strength, length_ms);
                self.cur_rumbling = length_ms;
                true
            }
            Err(e) => {
                log::warn!("Failed to start rumble: {}", e);
                false
            }
        }
    }

    pub fn stop_rumble(&mut self) {
        self.cur_rumbling = 0;
        if let Some(haptic) = self
            .cur_device
            .and_then(|id| self.controllers.get_mut(&id))
            .and_then(|dev| dev.haptic_mut())
        {
            if let Err(e) = self.backend.rumble_stop(haptic) {
                log::warn!("Failed to stop rumble: {}", e);
            }
        }
        self.events.push(ProgramEvent::TestStopped);
    }

    pub fn add_controller(&mut self, index: usize) {
        match DeviceHandle::open(&mut self.backend, index) {
            Ok(dev) => {
                let id = dev.id();
                if let Some(stale) = self.controllers.insert(id, dev) {
                    log::warn!("Device index {} resolved to open device {}, replacing it", index, id);
                    stale.close(&mut self.backend);
                }
                if self.cur_device.is_none() {
                    self.cur_device = Some(id);
                    self.events
                        .push(ProgramEvent::ControllersChanged { selection_changed: true });
                    return;
                }
            }
            Err(e) => log::warn!("{}", e),
        }
        self.events
            .push(ProgramEvent::ControllersChanged { selection_changed: false });
    }

    pub fn del_controller(&mut self, id: DeviceId) {
        if let Some(dev) = self.controllers.remove(&id) {
            dev.close(&mut self.backend);
        }
        let selection_changed = self.cur_device == Some(id);
        if selection_changed {
            self.cur_device = self.controllers.keys().next().copied();
        }
        self.events
            .push(ProgramEvent::ControllersChanged { selection_changed });
    }

    /// Forget every UI reference from the previous object table
    pub fn post_menu_switch<O: UiObject>(&mut self, objects: &mut [O]) {
        self.scroll_hold = None;
        self.mouse_over = None;
        self.set_capture(None);
        self.simulate_mouse_move(objects);
    }

    pub fn simulate_mouse_move<O: UiObject>(&mut self, objects: &mut [O]) {
        let pos = self.host.mouse_position();
        self.mouse_motion(pos, objects);
    }

    pub fn set_capture(&mut self, target: Option<ObjectId>) {
        self.captured = target;
        self.host.set_text_input(target.is_some());
    }

    fn confirm_capture<O: UiObject>(&mut self, objects: &mut [O]) {
        let Some(id) = self.captured else {
            return;
        };
        if let Some(Widget::LineEdit(edit)) = objects.get_mut(id.0).map(|obj| obj.widget()) {
            edit.confirm();
        }
        self.set_capture(None);
    }

    pub fn captured(&self) -> Option<ObjectId> {
        self.captured
    }

    pub fn hovered(&self) -> Option<ObjectId> {
        self.mouse_over
    }

    pub fn dragging(&self) -> Option<ObjectId> {
        self.scroll_hold
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.mouse_over == Some(id)
    }

    /// Notifications queued since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<ProgramEvent> {
        std::mem::take(&mut self.events)
    }

    fn current(&self) -> Result<&DeviceHandle<B>, InputError> {
        self.cur_device
            .and_then(|id| self.controllers.get(&id))
            .ok_or(InputError::NoCurrentDevice)
    }

    fn current_gamepad(&self) -> Result<&B::Gamepad, InputError> {
        let dev = self.current()?;
        dev.gamepad().ok_or(InputError::NotGamepad(dev.id()))
    }

    pub fn joystick_name(&self) -> Result<String, InputError> {
        Ok(self.backend.joystick_name(self.current()?.joystick()))
    }

    pub fn gamepad_name(&self) -> Result<String, InputError> {
        Ok(self.backend.gamepad_name(self.current_gamepad()?))
    }

    pub fn is_gamepad(&self) -> Result<bool, InputError> {
        Ok(self.current()?.is_gamepad())
    }

    pub fn is_haptic(&self) -> Result<bool, InputError> {
        Ok(self.current()?.is_haptic())
    }

    pub fn num_jbuttons(&self) -> Result<usize, InputError> {
        Ok(self.backend.num_buttons(self.current()?.joystick()))
    }

    pub fn num_jhats(&self) -> Result<usize, InputError> {
        Ok(self.backend.num_hats(self.current()?.joystick()))
    }

    pub fn num_jaxes(&self) -> Result<usize, InputError> {
        Ok(self.backend.num_axes(self.current()?.joystick()))
    }

    /// Indices of the pressed buttons
    pub fn joystick_buttons(&self) -> Result<Vec<usize>, InputError> {
        let joy = self.current()?.joystick();
        Ok((0..self.backend.num_buttons(joy))
            .filter(|i| self.backend.button(joy, *i))
            .collect())
    }

    pub fn joystick_hats(&self) -> Result<Vec<(usize, u8)>, InputError> {
        let joy = self.current()?.joystick();
        Ok((0..self.backend.num_hats(joy))
            .map(|i| (i, self.backend.hat(joy, i)))
            .collect())
    }

    pub fn joystick_axes(&self) -> Result<Vec<(usize, i16)>, InputError> {
        let joy = self.current()?.joystick();
        Ok((0..self.backend.num_axes(joy))
            .map(|i| (i, self.backend.axis(joy, i)))
            .collect())
    }

    /// Pressed buttons of the standard layout
    pub fn gamepad_buttons(&self) -> Result<Vec<GamepadButton>, InputError> {
        let pad = self.current_gamepad()?;
        Ok(GamepadButton::ALL
            .into_iter()
            .filter(|b| self.backend.gamepad_button(pad, *b))
            .collect())
    }

    pub fn gamepad_axes(&self) -> Result<Vec<(GamepadAxis, i16)>, InputError> {
        let pad = self.current_gamepad()?;
        Ok(GamepadAxis::ALL
            .into_iter()
            .map(|a| (a, self.backend.gamepad_axis(pad, a)))
            .collect())
    }

    pub fn cur_device(&self) -> Option<DeviceId> {
        self.cur_device
    }

    /// Ordinal of the current device, or the device count when none is selected
    pub fn cur_index(&self) -> usize {
        self.controllers
            .keys()
            .take_while(|id| Some(**id) != self.cur_device)
            .count()
    }

    pub fn num_controllers(&self) -> usize {
        self.controllers.len()
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.controllers.keys().copied().collect()
    }

    pub fn is_rumbling(&self) -> bool {
        self.cur_rumbling > 0
    }

    pub fn rumble_remaining(&self) -> u32 {
        self.cur_rumbling
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn host(&self) -> &W {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut W {
        &mut self.host
    }
}

impl<B: DeviceBackend, W: WindowHost> Drop for InputSys<B, W> {
    fn drop(&mut self) {
        for (_, dev) in std::mem::take(&mut self.controllers) {
            dev.close(&mut self.backend);
        }
    }
}
