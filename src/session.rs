// ============================================
// src/session.rs
// Flashcard and quiz study modes on top of the deck and the review store
// ============================================

use chrono::Utc;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::deck::{Card, Deck};
use crate::error::{Result, WordwizError};
use crate::scheduler::ReviewState;
use crate::store::ReviewStore;

/// Answer choices shown per quiz question, at most.
pub const QUIZ_OPTIONS: usize = 4;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Result of asking for the next flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw<'a> {
    Card(&'a Card),
    /// Every card is scheduled for later.
    Exhausted,
    /// The deck has no cards.
    Empty,
}

/// A card is eligible when it was never graded or its due time has passed.
pub fn is_eligible(store: &ReviewStore, key: &str, now_ms: i64) -> bool {
    store.state(key).is_none_or(|st| st.is_due(now_ms))
}

pub fn due_count(deck: &Deck, store: &ReviewStore, now_ms: i64) -> usize {
    deck.cards()
        .iter()
        .filter(|c| is_eligible(store, &c.key, now_ms))
        .count()
}

/// Picks a random eligible card.
pub fn next_flashcard<'a, R: Rng + ?Sized>(
    deck: &'a Deck,
    store: &ReviewStore,
    now_ms: i64,
    rng: &mut R,
) -> Draw<'a> {
    if deck.is_empty() {
        return Draw::Empty;
    }
    let due: Vec<&Card> = deck
        .cards()
        .iter()
        .filter(|c| is_eligible(store, &c.key, now_ms))
        .collect();
    match due.choose(rng) {
        Some(card) => Draw::Card(*card),
        None => Draw::Exhausted,
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub key: String,
    pub options: Vec<String>,
    /// Index of the right answer in `options`.
    pub answer: usize,
}

impl QuizQuestion {
    pub fn prompt(&self) -> String {
        format!("What does \"{}\" mean?", self.key)
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }

    /// Draws a card from the whole deck (due or not) and mixes its meaning with
    /// up to three other distinct meanings.
    pub fn generate<R: Rng + ?Sized>(deck: &Deck, rng: &mut R) -> Option<Self> {
        let card = deck.cards().choose(rng)?;

        let mut distractors: Vec<&str> = Vec::new();
        for c in deck.cards() {
            let t = c.target.as_str();
            if t != card.target && !distractors.contains(&t) {
                distractors.push(t);
            }
        }
        distractors.shuffle(rng);
        distractors.truncate(QUIZ_OPTIONS - 1);

        let mut options: Vec<String> = distractors.into_iter().map(str::to_string).collect();
        options.push(card.target.clone());
        options.shuffle(rng);
        let answer = options
            .iter()
            .position(|o| *o == card.target)
            .unwrap_or_default();

        Some(Self {
            key: card.key.clone(),
            options,
            answer,
        })
    }
}

/// Ties a deck, a review store and a random source together for one study run.
pub struct Session<'a, R: Rng> {
    deck: &'a Deck,
    store: &'a mut ReviewStore,
    rng: R,
}

impl<'a, R: Rng> Session<'a, R> {
    pub fn new(deck: &'a Deck, store: &'a mut ReviewStore, rng: R) -> Self {
        Self { deck, store, rng }
    }

    pub fn deck(&self) -> &Deck {
        self.deck
    }

    pub fn store(&self) -> &ReviewStore {
        &*self.store
    }

    pub fn flashcard(&mut self, now_ms: i64) -> Draw<'a> {
        next_flashcard(self.deck, &*self.store, now_ms, &mut self.rng)
    }

    /// Reveals the answer of a flashcard, which reviews it with a good grade.
    pub fn flip(&mut self, key: &str, now_ms: i64) -> Result<ReviewState> {
        self.ensure_known(key)?;
        let st = *self.store.flip_flashcard(key, now_ms)?;
        debug!(key, interval = st.interval, "flashcard flipped");
        Ok(st)
    }

    pub fn quiz(&mut self) -> Option<QuizQuestion> {
        QuizQuestion::generate(self.deck, &mut self.rng)
    }

    /// Grades the chosen option and returns whether it was right.
    pub fn answer(&mut self, question: &QuizQuestion, choice: usize, now_ms: i64) -> Result<bool> {
        self.ensure_known(&question.key)?;
        let correct = question.is_correct(choice);
        self.store.record_quiz_answer(&question.key, correct, now_ms)?;
        debug!(key = %question.key, correct, "quiz answered");
        Ok(correct)
    }

    fn ensure_known(&self, key: &str) -> Result<()> {
        match self.deck.get(key) {
            Some(_) => Ok(()),
            None => Err(WordwizError::UnknownCard(key.to_string())),
        }
    }
}
