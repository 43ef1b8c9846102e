use super::{DeviceBackend, DeviceId, GamepadAxis, GamepadButton, InputEvent};
use crate::force_feedback::GilrsRumble;
use gilrs::ev::Code;
use gilrs::{Axis, Button, EventType, Gamepad, GamepadId, Gilrs, MappingSource};

const HAT_UP: u8 = 0x01;
const HAT_RIGHT: u8 = 0x02;
const HAT_DOWN: u8 = 0x04;
const HAT_LEFT: u8 = 0x08;

/// Device backend on top of gilrs.
///
/// A device index is the position in gilrs' list of connected gamepads. gilrs has no
/// separate joystick and mapping objects, so both handles are the `GamepadId`.
pub struct GilrsBackend {
    gilrs: Gilrs,
}

impl GilrsBackend {
    pub fn new() -> anyhow::Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow::anyhow!("Failed to initialize gilrs: {}", e))?;
        Ok(Self { gilrs })
    }

    fn id_at(&self, index: usize) -> Option<GamepadId> {
        self.gilrs.gamepads().nth(index).map(|(id, _)| id)
    }

    fn pad(&self, id: GamepadId) -> Option<Gamepad<'_>> {
        self.gilrs.connected_gamepad(id)
    }

    /// Raw button codes in a stable order
    fn button_codes(&self, id: GamepadId) -> Vec<Code> {
        let Some(pad) = self.pad(id) else {
            return Vec::new();
        };
        let mut codes: Vec<Code> = pad.state().buttons().map(|(code, _)| code).collect();
        codes.sort_by_key(|code| code.into_u32());
        codes
    }

    fn axis_codes(&self, id: GamepadId) -> Vec<Code> {
        let Some(pad) = self.pad(id) else {
            return Vec::new();
        };
        let mut codes: Vec<Code> = pad.state().axes().map(|(code, _)| code).collect();
        codes.sort_by_key(|code| code.into_u32());
        codes
    }
}

fn to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

fn gilrs_button(button: GamepadButton) -> Button {
    match button {
        GamepadButton::South => Button::South,
        GamepadButton::East => Button::East,
        GamepadButton::West => Button::West,
        GamepadButton::North => Button::North,
        GamepadButton::Back => Button::Select,
        GamepadButton::Guide => Button::Mode,
        GamepadButton::Start => Button::Start,
        GamepadButton::LeftStick => Button::LeftThumb,
        GamepadButton::RightStick => Button::RightThumb,
        GamepadButton::LeftShoulder => Button::LeftTrigger,
        GamepadButton::RightShoulder => Button::RightTrigger,
        GamepadButton::DPadUp => Button::DPadUp,
        GamepadButton::DPadDown => Button::DPadDown,
        GamepadButton::DPadLeft => Button::DPadLeft,
        GamepadButton::DPadRight => Button::DPadRight,
    }
}

impl DeviceBackend for GilrsBackend {
    type Joystick = GamepadId;
    type Gamepad = GamepadId;
    type Haptic = GilrsRumble;

    fn num_joysticks(&self) -> usize {
        self.gilrs.gamepads().count()
    }

    fn is_game_controller(&self, index: usize) -> bool {
        self.gilrs
            .gamepads()
            .nth(index)
            .is_some_and(|(_, pad)| pad.mapping_source() != MappingSource::None)
    }

    fn open_gamepad(&mut self, index: usize) -> Option<GamepadId> {
        self.id_at(index)
    }

    fn gamepad_joystick(&self, gamepad: &GamepadId) -> Option<GamepadId> {
        self.pad(*gamepad).map(|pad| pad.id())
    }

    fn open_joystick(&mut self, index: usize) -> Option<GamepadId> {
        self.id_at(index)
    }

    fn instance_id(&self, joystick: &GamepadId) -> DeviceId {
        DeviceId(usize::from(*joystick))
    }

    fn is_haptic(&self, joystick: &GamepadId) -> bool {
        self.pad(*joystick).is_some_and(|pad| pad.is_ff_supported())
    }

    fn open_haptic(&mut self, joystick: &GamepadId) -> Option<GilrsRumble> {
        Some(GilrsRumble::new(*joystick))
    }

    fn rumble_init(&mut self, haptic: &mut GilrsRumble) -> anyhow::Result<()> {
        haptic.init(&mut self.gilrs)
    }

    fn rumble_play(
        &mut self,
        haptic: &mut GilrsRumble,
        strength: f32,
        length_ms: u32,
    ) -> anyhow::Result<()> {
        haptic.play(&mut self.gilrs, strength, length_ms)
    }

    fn rumble_stop(&mut self, haptic: &mut GilrsRumble) -> anyhow::Result<()> {
        haptic.stop()
    }

    fn close_haptic(&mut self, haptic: GilrsRumble) {
        drop(haptic);
    }

    fn close_gamepad(&mut self, gamepad: GamepadId) {
        log::debug!("Released gamepad mapping {}", gamepad);
    }

    fn close_joystick(&mut self, joystick: GamepadId) {
        log::debug!("Released joystick {}", joystick);
    }

    fn joystick_name(&self, joystick: &GamepadId) -> String {
        self.pad(*joystick)
            .map(|pad| pad.os_name().to_string())
            .unwrap_or_default()
    }

    fn gamepad_name(&self, gamepad: &GamepadId) -> String {
        self.pad(*gamepad)
            .map(|pad| pad.map_name().unwrap_or_else(|| pad.name()).to_string())
            .unwrap_or_default()
    }

    fn num_buttons(&self, joystick: &GamepadId) -> usize {
        self.button_codes(*joystick).len()
    }

    fn button(&self, joystick: &GamepadId, index: usize) -> bool {
        let (Some(pad), Some(code)) = (self.pad(*joystick), self.button_codes(*joystick).get(index).copied())
        else {
            return false;
        };
        pad.state().is_pressed(code)
    }

    fn num_axes(&self, joystick: &GamepadId) -> usize {
        self.axis_codes(*joystick).len()
    }

    fn axis(&self, joystick: &GamepadId, index: usize) -> i16 {
        let (Some(pad), Some(code)) = (self.pad(*joystick), self.axis_codes(*joystick).get(index).copied())
        else {
            return 0;
        };
        to_i16(pad.state().value(code))
    }

    /// gilrs folds hats into the d-pad, so a device has one hat when it has a d-pad
    fn num_hats(&self, joystick: &GamepadId) -> usize {
        self.pad(*joystick)
            .filter(|pad| {
                pad.button_code(Button::DPadUp).is_some() || pad.axis_code(Axis::DPadX).is_some()
            })
            .map_or(0, |_| 1)
    }

    fn hat(&self, joystick: &GamepadId, _index: usize) -> u8 {
        let Some(pad) = self.pad(*joystick) else {
            return 0;
        };
        let mut hat = 0;
        if pad.is_pressed(Button::DPadUp) || pad.value(Axis::DPadY) > 0.5 {
            hat |= HAT_UP;
        }
        if pad.is_pressed(Button::DPadRight) || pad.value(Axis::DPadX) > 0.5 {
            hat |= HAT_RIGHT;
        }
        if pad.is_pressed(Button::DPadDown) || pad.value(Axis::DPadY) < -0.5 {
            hat |= HAT_DOWN;
        }
        if pad.is_pressed(Button::DPadLeft) || pad.value(Axis::DPadX) < -0.5 {
            hat |= HAT_LEFT;
        }
        hat
    }

    fn gamepad_button(&self, gamepad: &GamepadId, button: GamepadButton) -> bool {
        self.pad(*gamepad)
            .is_some_and(|pad| pad.is_pressed(gilrs_button(button)))
    }

    fn gamepad_axis(&self, gamepad: &GamepadId, axis: GamepadAxis) -> i16 {
        let Some(pad) = self.pad(*gamepad) else {
            return 0;
        };
        let trigger = |button: Button| {
            pad.button_data(button)
                .map(|data| data.value())
                .unwrap_or(0.0)
        };
        match axis {
            GamepadAxis::LeftX => to_i16(pad.value(Axis::LeftStickX)),
            GamepadAxis::LeftY => to_i16(pad.value(Axis::LeftStickY)),
            GamepadAxis::RightX => to_i16(pad.value(Axis::RightStickX)),
            GamepadAxis::RightY => to_i16(pad.value(Axis::RightStickY)),
            GamepadAxis::TriggerLeft => to_i16(trigger(Button::LeftTrigger2)),
            GamepadAxis::TriggerRight => to_i16(trigger(Button::RightTrigger2)),
        }
    }

    /// Stops at each hot-plug event: a later disconnect in the same batch would shift
    /// the positions in `gamepads()` before the added index gets opened.
    fn poll_event(&mut self) -> Option<InputEvent> {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    match self.gilrs.gamepads().position(|(id, _)| id == event.id) {
                        Some(index) => {
                            log::info!("Gamepad {} connected at index {}", event.id, index);
                            return Some(InputEvent::ControllerAdded(index));
                        }
                        None => log::warn!("Gamepad {} connected but is not listed", event.id),
                    }
                }
                EventType::Disconnected => {
                    log::info!("Gamepad {} disconnected", event.id);
                    return Some(InputEvent::ControllerRemoved(DeviceId(usize::from(event.id))));
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_scaling_saturates() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(-1.0), -i16::MAX);
        assert_eq!(to_i16(7.0), i16::MAX);
    }

    #[test]
    fn back_and_guide_map_to_gilrs_names() {
        assert_eq!(gilrs_button(GamepadButton::Back), Button::Select);
        assert_eq!(gilrs_button(GamepadButton::Guide), Button::Mode);
        assert_eq!(gilrs_button(GamepadButton::LeftShoulder), Button::LeftTrigger);
    }
}
