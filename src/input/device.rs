use super::{DeviceBackend, DeviceId, InputError};

/// One open physical device plus its optional gamepad mapping and haptic actuator
pub struct DeviceHandle<B: DeviceBackend> {
    id: DeviceId,
    joystick: B::Joystick,
    gamepad: Option<B::Gamepad>,
    haptic: Option<B::Haptic>,
}

impl<B: DeviceBackend> DeviceHandle<B> {
    pub fn open(backend: &mut B, index: usize) -> Result<Self, InputError> {
        let gamepad = if backend.is_game_controller(index) {
            backend.open_gamepad(index)
        } else {
            None
        };

        // The mapping's joystick supersedes a raw open
        let joystick = match &gamepad {
            Some(pad) => backend.gamepad_joystick(pad),
            None => backend.open_joystick(index),
        };
        let Some(joystick) = joystick else {
            if let Some(pad) = gamepad {
                backend.close_gamepad(pad);
            }
            return Err(InputError::OpenFailed(index));
        };

        let haptic = if backend.is_haptic(&joystick) {
            backend.open_haptic(&joystick).map(|mut haptic| {
                if let Err(e) = backend.rumble_init(&mut haptic) {
                    log::warn!("Failed to initialize rumble for device at index {}: {}", index, e);
                }
                haptic
            })
        } else {
            None
        };

        let id = backend.instance_id(&joystick);
        log::info!(
            "Opened device {} ({}) - gamepad: {}, haptic: {}",
            id,
            backend.joystick_name(&joystick),
            gamepad.is_some(),
            haptic.is_some()
        );

        Ok(Self {
            id,
            joystick,
            gamepad,
            haptic,
        })
    }

    /// Release haptic, then the gamepad mapping (which owns the joystick) or the raw joystick
    pub fn close(self, backend: &mut B) {
        log::info!("Closing device {}", self.id);
        if let Some(haptic) = self.haptic {
            backend.close_haptic(haptic);
        }
        match self.gamepad {
            Some(pad) => backend.close_gamepad(pad),
            None => backend.close_joystick(self.joystick),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn joystick(&self) -> &B::Joystick {
        &self.joystick
    }

    pub fn gamepad(&self) -> Option<&B::Gamepad> {
        self.gamepad.as_ref()
    }

    pub fn haptic_mut(&mut self) -> Option<&mut B::Haptic> {
        self.haptic.as_mut()
    }

    pub fn is_gamepad(&self) -> bool {
        self.gamepad.is_some()
    }

    pub fn is_haptic(&self) -> bool {
        self.haptic.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mock::{MockBackend, MockDevice};

    #[test]
    fn gamepad_close_skips_raw_joystick() {
        let mut backend = MockBackend::new(vec![MockDevice::gamepad(7, "Pad").haptic()]);
        let dev = DeviceHandle::open(&mut backend, 0).expect("open");
        assert_eq!(dev.id(), DeviceId(7));
        assert!(dev.is_gamepad());
        assert!(dev.is_haptic());

        backend.calls.clear();
        dev.close(&mut backend);
        assert_eq!(backend.calls, vec!["close_haptic 0", "close_gamepad 0"]);
    }

    #[test]
    fn raw_joystick_is_closed_directly() {
        let mut backend = MockBackend::new(vec![MockDevice::joystick(3, "Stick")]);
        let dev = DeviceHandle::open(&mut backend, 0).expect("open");
        assert!(!dev.is_gamepad());
        assert!(!dev.is_haptic());

        backend.calls.clear();
        dev.close(&mut backend);
        assert_eq!(backend.calls, vec!["close_joystick 0"]);
    }

    #[test]
    fn haptic_is_initialized_on_open() {
        let mut backend = MockBackend::new(vec![MockDevice::joystick(1, "Wheel").haptic()]);
        let _dev = DeviceHandle::open(&mut backend, 0).expect("open");
        assert!(backend.calls.contains(&"rumble_init 0".to_string()));
    }

    #[test]
    fn open_failure_is_reported() {
        let mut backend = MockBackend::new(vec![MockDevice::joystick(1, "Broken").failing()]);
        let result = DeviceHandle::open(&mut backend, 0);
        assert!(matches!(result, Err(InputError::OpenFailed(0))));
    }

    #[test]
    fn half_open_gamepad_is_released_on_failure() {
        let mut backend = MockBackend::new(vec![MockDevice::gamepad(2, "Pad").failing()]);
        assert!(DeviceHandle::open(&mut backend, 0).is_err());
        assert_eq!(backend.calls.last().map(String::as_str), Some("close_gamepad 0"));
    }
}
