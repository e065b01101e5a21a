// ============================================
// src/deck.rs
// Vocabulary cards, the built-in starter list and CSV word-list import
// ============================================

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WordwizError};
use crate::romanize::romanize_thai;

/// Header names tried, in order, for each column.
const SOURCE_HEADERS: &[&str] = &["thai", "th", "source", "word", "term"];
const TARGET_HEADERS: &[&str] = &["english", "en", "meaning", "translation", "target"];
const ROMAN_HEADERS: &[&str] = &["roman", "romanization", "rtgs", "pronunciation"];

/// One vocabulary entry. `key` is the word in its source script and identifies the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub key: String,
    pub target: String,
    pub romanization: Option<String>,
}

impl Card {
    pub fn new(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
            romanization: None,
        }
    }

    pub fn with_romanization(mut self, roman: impl Into<String>) -> Self {
        self.romanization = Some(roman.into());
        self
    }
}

/// Built-in word list (source, target, romanization)
const STARTER_LIST: &[(&str, &str, &str)] = &[
    ("สวัสดี", "hello", "sawatdi"),
    ("ขอบคุณ", "thank you", "khop khun"),
    ("ใช่", "yes", "chai"),
    ("ไม่", "no", "mai"),
    ("น้ำ", "water", "nam"),
    ("ข้าว", "rice", "khao"),
    ("แมว", "cat", "maeo"),
    ("หมา", "dog", "ma"),
    ("บ้าน", "house", "ban"),
    ("รถ", "car", "rot"),
    ("ร้อน", "hot", "ron"),
    ("เย็น", "cold", "yen"),
    ("อร่อย", "delicious", "aroi"),
    ("เท่าไร", "how much", "thaorai"),
    ("ห้องน้ำ", "bathroom", "hong nam"),
    ("ตลาด", "market", "talat"),
];

/// Ordered collection of cards, unique by key.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
    index: HashMap<String, usize>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card, rejecting a key that is already present.
    pub fn insert(&mut self, card: Card) -> Result<()> {
        if self.index.contains_key(&card.key) {
            return Err(WordwizError::DuplicateCard(card.key));
        }
        self.index.insert(card.key.clone(), self.cards.len());
        self.cards.push(card);
        Ok(())
    }

    /// Builds a deck keeping the first card seen for each key.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut deck = Self::new();
        for card in cards {
            let key = card.key.clone();
            if deck.insert(card).is_err() {
                debug!(%key, "dropping duplicate card");
            }
        }
        deck
    }

    pub fn starter() -> Self {
        Self::from_cards(
            STARTER_LIST
                .iter()
                .map(|(key, target, roman)| Card::new(*key, *target).with_romanization(*roman)),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Card> {
        self.index.get(key).map(|&i| &self.cards[i])
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    // MARK: CSV import

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let deck = Self::from_csv_reader(File::open(path)?)?;
        info!(path = %path.display(), cards = deck.len(), "loaded word list");
        Ok(deck)
    }

    /// Reads a word list whose first row is a header.
    ///
    /// Columns are found by name (see [`find_column`]). Rows missing either the
    /// source or the target text are skipped, and when the sheet has no
    /// romanization column one is derived from the source text.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = csv.records();
        let header = match rows.next() {
            Some(row) => row?,
            None => return Err(WordwizError::EmptyDeck),
        };
        let headers: Vec<String> = header.iter().map(normalize_header).collect();

        let source_idx = find_column(&headers, SOURCE_HEADERS).ok_or(WordwizError::MissingColumn("source"))?;
        let target_idx = find_column(&headers, TARGET_HEADERS).ok_or(WordwizError::MissingColumn("target"))?;
        let roman_idx = find_column(&headers, ROMAN_HEADERS);

        let mut cards = Vec::new();
        for row in rows {
            let row = row?;
            let key = row.get(source_idx).unwrap_or_default();
            let target = row.get(target_idx).unwrap_or_default();
            if key.is_empty() || target.is_empty() {
                continue;
            }
            let romanization = match roman_idx {
                Some(i) => row.get(i).unwrap_or_default().to_string(),
                None => romanize_thai(key),
            };
            cards.push(Card {
                key: key.to_string(),
                target: target.to_string(),
                romanization: Some(romanization).filter(|r| !r.is_empty()),
            });
        }

        if cards.is_empty() {
            return Err(WordwizError::EmptyDeck);
        }
        Ok(Self::from_cards(cards))
    }
}

/// Lowercases and trims a header cell, dropping a BOM and stray quotes.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace('"', "")
        .trim()
        .to_lowercase()
}

/// For each candidate in order, the first header equal to it or containing it.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h == c || h.contains(c)))
}
