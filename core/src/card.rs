use serde::{Deserialize, Serialize};

use crate::types::Pos;

/// Canonical player-visible state of a single card.
///
/// A card keeps its position for the whole session; only the two face flags
/// ever change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card<S> {
    pos: Pos,
    symbol: S,
    revealed: bool,
    matched: bool,
}

impl<S> Card<S> {
    pub(crate) fn new(pos: Pos, symbol: S) -> Self {
        Self {
            pos,
            symbol,
            revealed: false,
            matched: false,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn symbol(&self) -> &S {
        &self.symbol
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_matched(&self) -> bool {
        self.matched
    }

    /// Whether a selection would currently flip this card face up.
    pub const fn is_selectable(&self) -> bool {
        !self.revealed && !self.matched
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }

    pub(crate) fn conceal(&mut self) {
        self.revealed = false;
    }

    /// Locks the card face up once its pair has been found.
    pub(crate) fn lock_matched(&mut self) {
        self.revealed = true;
        self.matched = true;
    }
}
