use std::time::Instant;

use tracing::{debug, info, warn};

use super::{PlayRequest, SoundboardController};
use crate::soundboard::SecondClock;

impl SoundboardController {
    /// Drive the timers from a frame timestamp; whole seconds become ticks.
    pub fn tick(&mut self, now: Instant) {
        let ticks = match self.clock.as_mut() {
            Some(clock) => clock.advance(now),
            None => {
                self.clock = Some(SecondClock::new(now));
                0
            }
        };
        for _ in 0..ticks {
            self.tick_second();
        }
    }

    /// One second of timer time.
    ///
    /// Timers hold still while the app waits for an API key.
    pub fn tick_second(&mut self) {
        if self.needs_credentials() {
            return;
        }
        if self.roulette_active && self.roulette.tick() {
            self.fire_roulette();
        }
        if self.deck_timer.tick() {
            self.refresh_deck();
        }
    }

    /// Switch roulette on or off. Turning it on restarts its countdown.
    pub fn toggle_roulette(&mut self) {
        if self.roulette_active {
            self.roulette_active = false;
            info!("Roulette off");
            return;
        }
        if let Err(err) = self.engine.ensure_output() {
            warn!("Audio output unavailable: {err}");
            self.set_status(format!("Audio output unavailable: {err}"));
        }
        self.roulette.reset();
        self.roulette_active = true;
        info!("Roulette on ({}s)", self.roulette.period());
    }

    fn fire_roulette(&mut self) {
        let Some(item) = self.pick_random_item() else {
            return;
        };
        match self.play(&item.id) {
            PlayRequest::Busy => debug!("Roulette skipped \"{}\" while loading", item.id),
            outcome => debug!("Roulette picked \"{}\": {outcome:?}", item.id),
        }
    }
}
