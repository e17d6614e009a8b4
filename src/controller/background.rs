use super::SoundboardController;
use super::jobs::{JobMessage, SynthesisPurpose};

impl SoundboardController {
    /// Apply finished jobs and ended voices. Call once per frame.
    pub fn poll_background_jobs(&mut self) {
        while let Ok(message) = self.jobs.try_recv_message() {
            match message {
                JobMessage::Synthesized(result) => match result.purpose {
                    SynthesisPurpose::Play => self.apply_play_synthesis(result),
                    SynthesisPurpose::Prefetch => self.apply_prefetch_synthesis(result),
                },
                JobMessage::DeckGenerated(result) => self.apply_deck_result(result),
            }
        }
        let finished = self.engine.reap_finished();
        self.handle_finished(finished);
    }
}
