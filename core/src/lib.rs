use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use card::*;
pub use clock::*;
pub use engine::*;
pub use error::*;
pub use types::*;

mod card;
mod clock;
mod engine;
mod error;
mod types;

/// How long a pending pair stays face up before it is resolved.
pub const DEFAULT_RESOLVE_DELAY: Duration = Duration::from_millis(800);

/// Validated session configuration: the symbols to pair and the pair
/// observation delay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig<S> {
    symbols: Vec<S>,
    pub resolve_delay: Duration,
}

impl<S: Symbol> GameConfig<S> {
    /// Builds a configuration from the symbols to pair up.
    ///
    /// Duplicates are dropped, so a symbol cannot be supplied with a
    /// multiplicity other than two. An empty set has no valid board and is
    /// rejected.
    pub fn new(symbols: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut distinct: Vec<S> = Vec::new();
        for symbol in symbols {
            if !distinct.contains(&symbol) {
                distinct.push(symbol);
            }
        }

        if distinct.is_empty() {
            return Err(GameError::InvalidConfiguration);
        }

        Ok(Self {
            symbols: distinct,
            resolve_delay: DEFAULT_RESOLVE_DELAY,
        })
    }

    pub fn with_resolve_delay(mut self, resolve_delay: Duration) -> Self {
        self.resolve_delay = resolve_delay;
        self
    }

    /// The distinct symbols to pair, in first-seen order.
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    pub fn pair_count(&self) -> PairCount {
        self.symbols.len() as PairCount
    }

    /// Total number of cards a board built from this configuration holds.
    pub fn board_size(&self) -> usize {
        self.symbols.len() * 2
    }
}

/// A session's play order: every distinct symbol appears exactly twice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck<S> {
    symbols: Vec<S>,
}

impl<S: Symbol> Deck<S> {
    /// Generates a freshly shuffled deck for `config`.
    ///
    /// Shuffling goes through `rand`'s Fisher-Yates implementation, so every
    /// permutation of the 2N cards is equally likely.
    pub fn generate<R: Rng + ?Sized>(config: &GameConfig<S>, rng: &mut R) -> Self {
        let mut symbols: Vec<S> = config
            .symbols
            .iter()
            .flat_map(|symbol| [symbol.clone(), symbol.clone()])
            .collect();
        symbols.shuffle(rng);
        Self { symbols }
    }

    /// Builds a deck with a fixed, caller-chosen order.
    ///
    /// Fails unless every symbol appears exactly twice.
    pub fn from_layout(symbols: impl Into<Vec<S>>) -> Result<Self> {
        let symbols = symbols.into();

        if symbols.is_empty() {
            return Err(GameError::InvalidConfiguration);
        }
        for symbol in &symbols {
            let copies = symbols.iter().filter(|other| *other == symbol).count();
            if copies != 2 {
                return Err(GameError::InvalidConfiguration);
            }
        }

        Ok(Self { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn pair_count(&self) -> PairCount {
        (self.symbols.len() / 2) as PairCount
    }

    /// The full play order, front of the board first.
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    /// The deck's symbol set with duplicates removed, in first-seen order.
    pub fn distinct_symbols(&self) -> Vec<S> {
        let mut distinct: Vec<S> = Vec::new();
        for symbol in &self.symbols {
            if !distinct.contains(symbol) {
                distinct.push(symbol.clone());
            }
        }
        distinct
    }

    pub(crate) fn into_cards(self) -> Vec<Card<S>> {
        self.symbols
            .into_iter()
            .enumerate()
            .map(|(pos, symbol)| Card::new(pos, symbol))
            .collect()
    }
}

/// Outcome of a selection event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    /// The input was ignored: illegal target, full buffer, or wrong phase.
    NoChange,
    /// First card of a pair flipped face up.
    Revealed,
    /// Second card flipped; resolution is due once the ticket expires.
    PairPending(ResolveTicket),
}

impl SelectOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Outcome of resolving a pending pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolveOutcome {
    /// The ticket no longer refers to the engine's pending pair.
    Stale,
    /// The pair did not match and was flipped back down.
    Mismatched,
    /// The pair matched and stays face up.
    Matched,
    /// The pair matched and completed the board.
    Completed,
}

impl ResolveOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use ResolveOutcome::*;
        match self {
            Stale => false,
            Mismatched => true,
            Matched => true,
            Completed => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_copies(deck: &Deck<char>, symbol: char) -> usize {
        deck.symbols().iter().filter(|&&s| s == symbol).count()
    }

    #[test]
    fn config_dedupes_symbols_before_pairing() {
        let config = GameConfig::new(['A', 'B', 'A', 'C']).unwrap();

        assert_eq!(config.symbols(), &['A', 'B', 'C']);
        assert_eq!(config.pair_count(), 3);
        assert_eq!(config.board_size(), 6);
    }

    #[test]
    fn empty_symbol_set_is_rejected() {
        let result = GameConfig::<char>::new([]);

        assert_eq!(result.unwrap_err(), GameError::InvalidConfiguration);
    }

    #[test]
    fn config_defaults_to_standard_resolve_delay() {
        let config = GameConfig::new(['A']).unwrap();

        assert_eq!(config.resolve_delay, DEFAULT_RESOLVE_DELAY);
    }

    #[test]
    fn generated_deck_pairs_every_symbol_twice() {
        let config = GameConfig::new(['A', 'B', 'C', 'D']).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        let deck = Deck::generate(&config, &mut rng);

        assert_eq!(deck.len(), 8);
        assert_eq!(deck.pair_count(), 4);
        for symbol in config.symbols() {
            assert_eq!(count_copies(&deck, *symbol), 2);
        }
    }

    #[test]
    fn generated_cards_start_face_down() {
        let config = GameConfig::new(['A', 'B']).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        let cards = Deck::generate(&config, &mut rng).into_cards();

        for (pos, card) in cards.iter().enumerate() {
            assert_eq!(card.pos(), pos);
            assert!(!card.is_revealed());
            assert!(!card.is_matched());
            assert!(card.is_selectable());
        }
    }

    #[test]
    fn from_layout_requires_every_symbol_exactly_twice() {
        assert!(Deck::from_layout(['A', 'B', 'A', 'B']).is_ok());
        assert_eq!(
            Deck::from_layout(['A', 'B', 'A']).unwrap_err(),
            GameError::InvalidConfiguration
        );
        assert_eq!(
            Deck::from_layout(['A', 'A', 'A', 'A']).unwrap_err(),
            GameError::InvalidConfiguration
        );
        assert_eq!(
            Deck::<char>::from_layout([]).unwrap_err(),
            GameError::InvalidConfiguration
        );
    }

    #[test]
    fn same_seed_reproduces_the_same_order() {
        let config = GameConfig::new(['A', 'B', 'C', 'D', 'E', 'F']).unwrap();

        let first = Deck::generate(&config, &mut SmallRng::seed_from_u64(42));
        let second = Deck::generate(&config, &mut SmallRng::seed_from_u64(42));

        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_vary_the_order() {
        let config = GameConfig::new(['A', 'B', 'C', 'D', 'E', 'F']).unwrap();
        let reference = Deck::generate(&config, &mut SmallRng::seed_from_u64(1));

        let varied = (2..10)
            .map(|seed| Deck::generate(&config, &mut SmallRng::seed_from_u64(seed)))
            .any(|deck| deck != reference);

        assert!(varied);
    }

    #[test]
    fn shuffle_does_not_bias_the_first_position() {
        let config = GameConfig::new(['A', 'B']).unwrap();

        let first_is_a = (0..400)
            .filter(|&seed| {
                let deck = Deck::generate(&config, &mut SmallRng::seed_from_u64(seed));
                deck.symbols()[0] == 'A'
            })
            .count();

        // mean 200 for an unbiased shuffle; bounds are generous on purpose
        assert!((120..=280).contains(&first_is_a), "got {first_is_a}");
    }
}
