//! Soundboard domain: items and decks, the audio cache, the history feed and
//! the countdowns that drive roulette and deck evolution.

pub mod cache;
pub mod history;
pub mod item;
pub mod timers;

pub use cache::{EncodedAudio, SoundCache};
pub use history::{HISTORY_LIMIT, HistoryEntry, HistoryLog, format_clock};
pub use item::{COLOR_TAGS, Deck, SoundboardItem, default_deck};
pub use timers::{Countdown, SecondClock, format_countdown};
