// Engine-level playback tests driven through a detached mixer.
use super::*;
use std::sync::Arc;

fn constant_buffer(frames: usize, value: f32) -> PcmBuffer {
    PcmBuffer {
        samples: Arc::from(vec![value; frames * MIX_FORMAT.channels as usize]),
        sample_rate: MIX_FORMAT.sample_rate,
        channels: MIX_FORMAT.channels,
    }
}

fn render_frames(engine: &mut PlaybackEngine, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0; frames * MIX_FORMAT.channels as usize];
    engine.render(&mut out);
    out
}

#[test]
fn detached_engine_never_opens_a_device() {
    let mut engine = PlaybackEngine::detached(0.8);
    assert!(engine.ensure_output().is_ok());
    assert!(!engine.is_output_open());
    assert!(engine.output_details().is_none());
}

#[test]
fn natural_end_is_reaped_with_its_tag() {
    let mut engine = PlaybackEngine::detached(1.0);
    let id = engine.start(&constant_buffer(100, 0.1), "bruh").unwrap();
    assert_eq!(engine.active_count(), 1);
    render_frames(&mut engine, 64);
    assert!(engine.reap_finished().is_empty());
    render_frames(&mut engine, 64);
    let finished = engine.reap_finished();
    assert_eq!(
        finished,
        vec![FinishedVoice {
            id,
            tag: "bruh".into(),
            reason: FinishReason::Ended,
        }]
    );
    assert_eq!(engine.active_count(), 0);
}

#[test]
fn stop_all_is_idempotent() {
    let mut engine = PlaybackEngine::detached(1.0);
    engine.start(&constant_buffer(48_000, 0.1), "fbi").unwrap();
    engine.start(&constant_buffer(48_000, 0.1), "wow").unwrap();
    let stopped = engine.stop_all();
    assert_eq!(stopped.len(), 2);
    assert!(engine.stop_all().is_empty());
    assert_eq!(engine.active_count(), 0);
    assert!(render_frames(&mut engine, 32).iter().all(|s| *s == 0.0));
    assert!(engine.reap_finished().is_empty());
}

#[test]
fn speech_buffers_play_at_mix_rate() {
    let mut engine = PlaybackEngine::detached(1.0);
    let buffer = decode_speech(&encode_speech(&[16_384; 240])).unwrap();
    assert_eq!(buffer.duration().as_millis(), 10);
    engine.start(&buffer, "oof").unwrap();
    // 10 ms at 48 kHz is 480 frames; leave some room for resampler edges.
    render_frames(&mut engine, 470);
    assert!(engine.reap_finished().is_empty());
    render_frames(&mut engine, 64);
    assert_eq!(engine.reap_finished().len(), 1);
}

#[test]
fn volume_change_ramps_and_applies_to_later_voices() {
    let mut engine = PlaybackEngine::detached(0.8);
    engine.start(&constant_buffer(96_000, 1.0), "first").unwrap();
    engine.set_volume(0.3);
    assert_eq!(engine.volume(), 0.3);

    let first = render_frames(&mut engine, 1);
    assert!(first[0] < 0.8 && first[0] > 0.79, "gain must not jump: {}", first[0]);

    // One time constant later the gain is about 63% of the way to 0.3.
    let tau_frames = (VOLUME_TIME_CONSTANT.as_secs_f32() * MIX_FORMAT.sample_rate as f32) as usize;
    let out = render_frames(&mut engine, tau_frames - 1);
    let expected = 0.3 + 0.5 * (-1.0f32).exp();
    let last = out[out.len() - 1];
    assert!((last - expected).abs() < 0.01, "{last} vs {expected}");

    render_frames(&mut engine, MIX_FORMAT.sample_rate as usize);
    assert!((engine.current_gain() - 0.3).abs() < 1e-4);

    engine.stop_all();
    engine.start(&constant_buffer(64, 1.0), "second").unwrap();
    let later = render_frames(&mut engine, 8);
    assert!(later.iter().all(|s| (s - 0.3).abs() < 1e-4));
}

#[test]
fn volume_is_clamped() {
    let mut engine = PlaybackEngine::detached(1.5);
    assert_eq!(engine.volume(), 1.0);
    engine.set_volume(-0.2);
    assert_eq!(engine.volume(), 0.0);
}
