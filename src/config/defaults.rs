/// Largest deck the generator is asked for.
pub(super) const MAX_DECK_SIZE: usize = 48;

pub(super) fn default_volume() -> f32 {
    0.8
}

pub(super) fn default_roulette_interval_secs() -> u32 {
    10
}

pub(super) fn default_deck_refresh_interval_secs() -> u32 {
    180
}

pub(super) fn default_prefetch_count() -> usize {
    4
}

pub(super) fn default_deck_size() -> usize {
    12
}

pub(super) fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        default_volume()
    }
}

pub(super) fn clamp_period(secs: u32) -> u32 {
    secs.max(1)
}

pub(super) fn clamp_count(count: usize) -> usize {
    count.clamp(1, MAX_DECK_SIZE)
}
