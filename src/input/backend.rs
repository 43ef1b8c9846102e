use super::{DeviceId, GamepadAxis, GamepadButton, InputEvent, Point};

/// Platform input library: device enumeration, lifecycle, state reads and haptics.
///
/// Device indices are positions in the platform's current device list and are only
/// meaningful until the next hot-plug event. Handles returned by the `open_*` calls
/// stay valid until passed back to the matching `close_*` call.
pub trait DeviceBackend {
    type Joystick;
    type Gamepad;
    type Haptic;

    fn num_joysticks(&self) -> usize;

    /// Does the device at `index` expose a standard controller layout?
    fn is_game_controller(&self, index: usize) -> bool;

    fn open_gamepad(&mut self, index: usize) -> Option<Self::Gamepad>;

    /// Joystick handle backing a gamepad mapping. Closing the mapping closes it too.
    fn gamepad_joystick(&self, gamepad: &Self::Gamepad) -> Option<Self::Joystick>;

    fn open_joystick(&mut self, index: usize) -> Option<Self::Joystick>;

    fn instance_id(&self, joystick: &Self::Joystick) -> DeviceId;

    fn is_haptic(&self, joystick: &Self::Joystick) -> bool;

    fn open_haptic(&mut self, joystick: &Self::Joystick) -> Option<Self::Haptic>;

    /// Prepare the actuator for simple rumble playback
    fn rumble_init(&mut self, haptic: &mut Self::Haptic) -> anyhow::Result<()>;

    /// Play a rumble at `strength` (0.0 to 1.0) for `length_ms`
    fn rumble_play(
        &mut self,
        haptic: &mut Self::Haptic,
        strength: f32,
        length_ms: u32,
    ) -> anyhow::Result<()>;

    /// Stop playback. Stopping an idle actuator must succeed.
    fn rumble_stop(&mut self, haptic: &mut Self::Haptic) -> anyhow::Result<()>;

    fn close_haptic(&mut self, haptic: Self::Haptic);
    fn close_gamepad(&mut self, gamepad: Self::Gamepad);
    fn close_joystick(&mut self, joystick: Self::Joystick);

    fn joystick_name(&self, joystick: &Self::Joystick) -> String;
    fn gamepad_name(&self, gamepad: &Self::Gamepad) -> String;

    fn num_buttons(&self, joystick: &Self::Joystick) -> usize;
    fn button(&self, joystick: &Self::Joystick, index: usize) -> bool;
    fn num_axes(&self, joystick: &Self::Joystick) -> usize;
    fn axis(&self, joystick: &Self::Joystick, index: usize) -> i16;
    fn num_hats(&self, joystick: &Self::Joystick) -> usize;
    fn hat(&self, joystick: &Self::Joystick, index: usize) -> u8;

    fn gamepad_button(&self, gamepad: &Self::Gamepad, button: GamepadButton) -> bool;
    fn gamepad_axis(&self, gamepad: &Self::Gamepad, axis: GamepadAxis) -> i16;

    /// Process platform events up to the next hot-plug change and return it.
    ///
    /// A `ControllerAdded` index is only valid until the next call, so callers
    /// act on each event before polling again.
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Window system side: pointer position and on-screen text input
pub trait WindowHost {
    fn mouse_position(&self) -> Point;
    fn set_text_input(&mut self, enabled: bool);
}
