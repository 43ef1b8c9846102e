use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat, Replay, Ticks};
use gilrs::{GamepadId, Gilrs};

/// Simple two-motor rumble on one gamepad, built on gilrs force feedback.
///
/// Each playback uploads a fresh effect: the strong (low frequency) and weak (high
/// frequency) motors both run at the requested strength for the requested length.
pub struct GilrsRumble {
    gamepad: GamepadId,
    effect: Option<Effect>,
}

impl GilrsRumble {
    pub fn new(gamepad: GamepadId) -> Self {
        Self {
            gamepad,
            effect: None,
        }
    }

    /// Upload a silent effect to make sure the device accepts rumble at all
    pub fn init(&mut self, gilrs: &mut Gilrs) -> anyhow::Result<()> {
        let effect = self.build(gilrs, 0.0, 0)?;
        log::debug!("Rumble ready on gamepad {}", self.gamepad);
        self.effect = Some(effect);
        Ok(())
    }

    pub fn play(&mut self, gilrs: &mut Gilrs, strength: f32, length_ms: u32) -> anyhow::Result<()> {
        let effect = self.build(gilrs, strength, length_ms)?;
        effect
            .play()
            .map_err(|e| anyhow::anyhow!("Failed to play rumble effect: {}", e))?;
        // Replacing the previous effect drops it, which also stops it
        self.effect = Some(effect);
        Ok(())
    }

    pub fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(ref effect) = self.effect {
            effect
                .stop()
                .map_err(|e| anyhow::anyhow!("Failed to stop rumble effect: {}", e))?;
        }
        Ok(())
    }

    fn build(&self, gilrs: &mut Gilrs, strength: f32, length_ms: u32) -> anyhow::Result<Effect> {
        let magnitude = (strength.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        let length = Ticks::from_ms(length_ms);
        let scheduling = Replay {
            play_for: length,
            ..Default::default()
        };

        EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong { magnitude },
                scheduling,
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak { magnitude },
                scheduling,
                ..Default::default()
            })
            .repeat(Repeat::For(length))
            .gamepads(&[self.gamepad])
            .finish(gilrs)
            .map_err(|e| anyhow::anyhow!("Failed to create rumble effect: {}", e))
    }
}

impl Drop for GilrsRumble {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Failed to stop rumble on drop: {}", e);
        }
    }
}
