use std::sync::Arc;
use std::time::Duration;

use rodio::Source;
use rodio::source::UniformSourceIterator;

use super::decode::PcmBuffer;
use super::mixer::MixFormat;

/// Identifier of one playback inside the mixer.
pub type VoiceId = u64;

/// Plays a shared decoded buffer from the start without copying it.
#[derive(Clone)]
pub(crate) struct PcmSource {
    samples: Arc<[f32]>,
    position: usize,
    sample_rate: u32,
    channels: u16,
}

impl PcmSource {
    pub(crate) fn new(buffer: &PcmBuffer) -> Self {
        Self {
            samples: buffer.samples.clone(),
            position: 0,
            sample_rate: buffer.sample_rate,
            channels: buffer.channels,
        }
    }
}

impl Iterator for PcmSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.samples.get(self.position).copied()?;
        self.position += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl Source for PcmSource {
    #[inline]
    fn current_span_len(&self) -> Option<usize> {
        // The format never changes, so the whole buffer is one span.
        None
    }

    #[inline]
    fn channels(&self) -> u16 {
        self.channels
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    fn total_duration(&self) -> Option<Duration> {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        if self.sample_rate == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64))
    }
}

/// One active playback, converted to the mixer's format.
pub(crate) struct Voice {
    pub(crate) id: VoiceId,
    /// Caller-supplied label (the item id) reported back when the voice ends.
    pub(crate) tag: String,
    source: UniformSourceIterator<PcmSource>,
}

impl Voice {
    pub(crate) fn new(id: VoiceId, tag: &str, buffer: &PcmBuffer, format: MixFormat) -> Self {
        let source =
            UniformSourceIterator::new(PcmSource::new(buffer), format.channels, format.sample_rate);
        Self {
            id,
            tag: tag.to_string(),
            source,
        }
    }

    #[inline]
    pub(crate) fn next_sample(&mut self) -> Option<f32> {
        self.source.next()
    }
}
