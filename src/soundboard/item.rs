use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One button on the board.
///
/// Items are never edited in place; a deck evolution swaps the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundboardItem {
    /// Stable identifier, unique within a deck. Also the cache key.
    pub id: String,
    /// Short display text.
    pub label: String,
    /// Instruction handed to speech synthesis.
    pub prompt: String,
    /// Display glyph.
    pub emoji: String,
    /// Style token used to tint the active button.
    pub color: String,
}

impl SoundboardItem {
    pub fn new(id: &str, label: &str, prompt: &str, emoji: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            prompt: prompt.to_string(),
            emoji: emoji.to_string(),
            color: color.to_string(),
        }
    }
}

/// Ordered set of items, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    items: Vec<SoundboardItem>,
}

impl Deck {
    /// Build a deck, repairing blank or duplicate ids so every id is unique.
    ///
    /// Items whose label and prompt are both blank are dropped.
    pub fn from_items(items: Vec<SoundboardItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| !item.label.trim().is_empty() || !item.prompt.trim().is_empty())
            .map(|mut item| {
                let base = if item.id.trim().is_empty() {
                    slugify(&item.label)
                } else {
                    item.id.trim().to_string()
                };
                let mut id = base.clone();
                let mut suffix = 2;
                while !seen.insert(id.clone()) {
                    id = format!("{base}-{suffix}");
                    suffix += 1;
                }
                item.id = id;
                item
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[SoundboardItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&SoundboardItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "item".to_string() } else { slug }
}

/// Color tokens offered to the deck generator and understood by the UI.
pub const COLOR_TAGS: [&str; 12] = [
    "bg-slate-700",
    "bg-pink-600",
    "bg-red-600",
    "bg-blue-500",
    "bg-yellow-500",
    "bg-orange-600",
    "bg-indigo-700",
    "bg-amber-600",
    "bg-emerald-600",
    "bg-purple-700",
    "bg-lime-600",
    "bg-rose-400",
];

/// The board shown at startup, before any evolution.
pub fn default_deck() -> Deck {
    Deck::from_items(vec![
        SoundboardItem::new(
            "bruh",
            "Bruh",
            "Say \"Bruh\" in a deep, resonant, disappointed voice.",
            "🗿",
            "bg-slate-700",
        ),
        SoundboardItem::new(
            "oh-no",
            "Oh No",
            "Say \"Oh no, oh no, oh no no no no no\" in a high-pitched, comical rhythmic way.",
            "🙈",
            "bg-pink-600",
        ),
        SoundboardItem::new(
            "emotional-damage",
            "Emotional Damage",
            "Shout \"Emotional Damage!\" with a strong comedic emphasis.",
            "📉",
            "bg-red-600",
        ),
        SoundboardItem::new(
            "why-you-bully",
            "Bully Me?",
            "Say \"Why you bully me? Why you bully me?\" in a confused tone.",
            "🥺",
            "bg-blue-500",
        ),
        SoundboardItem::new(
            "wow",
            "Wow",
            "Say \"Wow\" exactly like Owen Wilson.",
            "🤩",
            "bg-yellow-500",
        ),
        SoundboardItem::new(
            "damn-son",
            "Damn Son",
            "Say \"Damn son, where did you find this?\" in a classic 2010s trap producer tag style.",
            "🕶️",
            "bg-orange-600",
        ),
        SoundboardItem::new(
            "fbi",
            "FBI Open Up",
            "Shout \"FBI! OPEN UP!\" with loud banging sound effects described as \"boom boom boom\".",
            "🚓",
            "bg-indigo-700",
        ),
        SoundboardItem::new(
            "bonk",
            "Bonk",
            "Say the word \"Bonk\" but make it sound like a cartoon hammer hitting a dog.",
            "🔨",
            "bg-amber-600",
        ),
        SoundboardItem::new(
            "directed-by",
            "Directed By",
            "Say \"Directed by Robert B Weide\" with a circus-like energy.",
            "🎬",
            "bg-emerald-600",
        ),
        SoundboardItem::new(
            "no-god",
            "No God No",
            "Scream \"No God, please no! No! NO! NOOOOOO!\" like Michael Scott.",
            "😱",
            "bg-purple-700",
        ),
        SoundboardItem::new(
            "dog-doin",
            "What Dog Doin?",
            "Say \"What da dog doin?\" in a curious, muffled voice.",
            "🐕",
            "bg-lime-600",
        ),
        SoundboardItem::new(
            "yamete",
            "Yamete",
            "Say \"Yamete Kudasai!\" in a stereotypical high-pitched anime voice.",
            "🌸",
            "bg-rose-400",
        ),
    ])
}
