//! Scripted platform for tests. Handles are indices into `MockBackend::devices`.

use std::cell::RefCell;
use std::rc::Rc;

use super::{DeviceBackend, DeviceId, GamepadAxis, GamepadButton, InputEvent, Point, WindowHost};

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub instance: usize,
    pub name: String,
    pub gamepad: bool,
    pub haptic: bool,
    pub fail_open: bool,
    pub reject_rumble: bool,
    pub buttons: Vec<bool>,
    pub axes: Vec<i16>,
    pub hats: Vec<u8>,
    pub pad_buttons: Vec<GamepadButton>,
    pub pad_axes: Vec<(GamepadAxis, i16)>,
}

impl MockDevice {
    pub fn joystick(instance: usize, name: &str) -> Self {
        Self {
            instance,
            name: name.to_string(),
            gamepad: false,
            haptic: false,
            fail_open: false,
            reject_rumble: false,
            buttons: Vec::new(),
            axes: Vec::new(),
            hats: Vec::new(),
            pad_buttons: Vec::new(),
            pad_axes: Vec::new(),
        }
    }

    pub fn gamepad(instance: usize, name: &str) -> Self {
        Self {
            gamepad: true,
            ..Self::joystick(instance, name)
        }
    }

    pub fn haptic(mut self) -> Self {
        self.haptic = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn rejecting_rumble(mut self) -> Self {
        self.reject_rumble = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub devices: Vec<MockDevice>,
    /// Every lifecycle and haptic call, in order, as "<call> <device index>"
    pub calls: Vec<String>,
    pub pending: Vec<InputEvent>,
    /// Mirror of `calls` that outlives the backend
    pub shared: Option<Rc<RefCell<Vec<String>>>>,
}

impl MockBackend {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            calls: Vec::new(),
            pending: Vec::new(),
            shared: None,
        }
    }

    /// Plug in a device and return the index `add_controller` expects
    pub fn plug(&mut self, device: MockDevice) -> usize {
        self.devices.push(device);
        self.devices.len() - 1
    }

    fn log(&mut self, call: &str, index: usize) {
        let line = format!("{} {}", call, index);
        if let Some(shared) = &self.shared {
            shared.borrow_mut().push(line.clone());
        }
        self.calls.push(line);
    }
}

impl DeviceBackend for MockBackend {
    type Joystick = usize;
    type Gamepad = usize;
    type Haptic = usize;

    fn num_joysticks(&self) -> usize {
        self.devices.len()
    }

    fn is_game_controller(&self, index: usize) -> bool {
        self.devices.get(index).is_some_and(|d| d.gamepad)
    }

    fn open_gamepad(&mut self, index: usize) -> Option<usize> {
        self.log("open_gamepad", index);
        self.devices.get(index).filter(|d| d.gamepad).map(|_| index)
    }

    fn gamepad_joystick(&self, gamepad: &usize) -> Option<usize> {
        self.devices
            .get(*gamepad)
            .filter(|d| !d.fail_open)
            .map(|_| *gamepad)
    }

    fn open_joystick(&mut self, index: usize) -> Option<usize> {
        self.log("open_joystick", index);
        self.devices
            .get(index)
            .filter(|d| !d.fail_open)
            .map(|_| index)
    }

    fn instance_id(&self, joystick: &usize) -> DeviceId {
        DeviceId(self.devices[*joystick].instance)
    }

    fn is_haptic(&self, joystick: &usize) -> bool {
        self.devices[*joystick].haptic
    }

    fn open_haptic(&mut self, joystick: &usize) -> Option<usize> {
        self.log("open_haptic", *joystick);
        Some(*joystick)
    }

    fn rumble_init(&mut self, haptic: &mut usize) -> anyhow::Result<()> {
        self.log("rumble_init", *haptic);
        Ok(())
    }

    fn rumble_play(&mut self, haptic: &mut usize, strength: f32, length_ms: u32) -> anyhow::Result<()> {
        self.calls
            .push(format!("rumble_play {} {:.2} {}", haptic, strength, length_ms));
        if self.devices[*haptic].reject_rumble {
            anyhow::bail!("rumble rejected");
        }
        Ok(())
    }

    fn rumble_stop(&mut self, haptic: &mut usize) -> anyhow::Result<()> {
        self.log("rumble_stop", *haptic);
        Ok(())
    }

    fn close_haptic(&mut self, haptic: usize) {
        self.log("close_haptic", haptic);
    }

    fn close_gamepad(&mut self, gamepad: usize) {
        self.log("close_gamepad", gamepad);
    }

    fn close_joystick(&mut self, joystick: usize) {
        self.log("close_joystick", joystick);
    }

    fn joystick_name(&self, joystick: &usize) -> String {
        self.devices[*joystick].name.clone()
    }

    fn gamepad_name(&self, gamepad: &usize) -> String {
        format!("{} (mapped)", self.devices[*gamepad].name)
    }

    fn num_buttons(&self, joystick: &usize) -> usize {
        self.devices[*joystick].buttons.len()
    }

    fn button(&self, joystick: &usize, index: usize) -> bool {
        self.devices[*joystick].buttons[index]
    }

    fn num_axes(&self, joystick: &usize) -> usize {
        self.devices[*joystick].axes.len()
    }

    fn axis(&self, joystick: &usize, index: usize) -> i16 {
        self.devices[*joystick].axes[index]
    }

    fn num_hats(&self, joystick: &usize) -> usize {
        self.devices[*joystick].hats.len()
    }

    fn hat(&self, joystick: &usize, index: usize) -> u8 {
        self.devices[*joystick].hats[index]
    }

    fn gamepad_button(&self, gamepad: &usize, button: GamepadButton) -> bool {
        self.devices[*gamepad].pad_buttons.contains(&button)
    }

    fn gamepad_axis(&self, gamepad: &usize, axis: GamepadAxis) -> i16 {
        self.devices[*gamepad]
            .pad_axes
            .iter()
            .find(|(a, _)| *a == axis)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        if self.pending.is_empty() {
            return None;
        }
        self.calls.push("poll_event".to_string());
        Some(self.pending.remove(0))
    }
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub pointer: Point,
    pub text_input: bool,
}

impl WindowHost for MockHost {
    fn mouse_position(&self) -> Point {
        self.pointer
    }

    fn set_text_input(&mut self, enabled: bool) {
        self.text_input = enabled;
    }
}
