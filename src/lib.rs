// ============================================
// src/lib.rs
// WORD WiZ: vocabulary study with spaced repetition
// ============================================

pub mod deck;
pub mod error;
pub mod romanize;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod store;

pub use deck::{Card, Deck};
pub use error::{Result, WordwizError};
pub use scheduler::{Grade, ReviewState, schedule};
pub use session::{Draw, QuizQuestion, Session};
pub use settings::{AppPaths, Settings};
pub use store::{PersistedState, ReviewStore, Stats, StorageFormat};
