use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Resolving,
    Complete,
}

impl GameStatus {
    pub const fn is_resolving(self) -> bool {
        matches!(self, Self::Resolving)
    }

    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Handle for one scheduled resolution.
///
/// Issued when the second card of a pair is selected. The external scheduler
/// holds it until `due_at`, then hands it back to [`MatchEngine::resolve`].
/// A ticket superseded by a reset, or whose pair already resolved, is
/// rejected as stale, so a late timer can never touch a later session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolveTicket {
    generation: Generation,
    due_at: Instant,
}

impl ResolveTicket {
    /// Deadline after which the scheduler should invoke the resolution.
    pub fn due_at(&self) -> Instant {
        self.due_at
    }
}

/// Hook invoked with the time a finished session took.
pub type CompletionHook = Box<dyn FnMut(Duration)>;

/// Immutable render state handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<S> {
    pub cards: Vec<Card<S>>,
    pub score: PairCount,
    pub status: GameStatus,
    /// Time the session took; present only once the board is complete.
    pub elapsed_millis: Option<u64>,
}

/// A memory-game session from start to completion or the next reset.
///
/// All transitions take `&mut self`, so the borrow checker serializes them;
/// the resolution delay is the only suspension point and is represented by
/// the pending [`ResolveTicket`] rather than an internal timer.
pub struct MatchEngine<S, C = SystemClock> {
    config: GameConfig<S>,
    board: Vec<Card<S>>,
    pending_pair: SmallVec<[Pos; 2]>,
    pending_resolve: Option<ResolveTicket>,
    score: PairCount,
    status: GameStatus,
    generation: Generation,
    started_at: Instant,
    finished_in: Option<Duration>,
    rng: SmallRng,
    clock: C,
    on_complete: Option<CompletionHook>,
}

impl<S: Symbol> MatchEngine<S> {
    /// Starts a session with an OS-seeded shuffle and the system clock.
    pub fn new(config: GameConfig<S>) -> Self {
        Self::assemble(config, SmallRng::from_os_rng(), SystemClock)
    }

    /// Starts a session whose shuffles are reproducible from `seed`.
    pub fn with_seed(config: GameConfig<S>, seed: u64) -> Self {
        Self::with_clock(config, seed, SystemClock)
    }
}

impl<S: Symbol, C: Clock> MatchEngine<S, C> {
    pub fn with_clock(config: GameConfig<S>, seed: u64, clock: C) -> Self {
        Self::assemble(config, SmallRng::seed_from_u64(seed), clock)
    }

    /// Starts a session on a fixed, pre-arranged board.
    ///
    /// Later resets reshuffle the deck's symbol set as usual.
    pub fn from_deck(deck: Deck<S>, resolve_delay: Duration, seed: u64, clock: C) -> Self {
        let config = GameConfig::new(deck.distinct_symbols())
            .expect("a deck always holds at least one pair")
            .with_resolve_delay(resolve_delay);
        let board = deck.into_cards();
        Self::from_parts(config, board, SmallRng::seed_from_u64(seed), clock)
    }

    fn assemble(config: GameConfig<S>, mut rng: SmallRng, clock: C) -> Self {
        let board = Deck::generate(&config, &mut rng).into_cards();
        Self::from_parts(config, board, rng, clock)
    }

    fn from_parts(config: GameConfig<S>, board: Vec<Card<S>>, rng: SmallRng, clock: C) -> Self {
        let started_at = clock.now();
        log::debug!("new session with {} pairs", config.pair_count());
        Self {
            config,
            board,
            pending_pair: SmallVec::new(),
            pending_resolve: None,
            score: 0,
            status: GameStatus::default(),
            generation: 0,
            started_at,
            finished_in: None,
            rng,
            clock,
            on_complete: None,
        }
    }

    /// Registers the hook invoked once per session when the board completes.
    pub fn set_on_complete(&mut self, hook: impl FnMut(Duration) + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> PairCount {
        self.score
    }

    pub fn cards(&self) -> &[Card<S>] {
        &self.board
    }

    pub fn card_at(&self, pos: Pos) -> Option<&Card<S>> {
        self.board.get(pos)
    }

    pub fn config(&self) -> &GameConfig<S> {
        &self.config
    }

    pub fn pair_count(&self) -> PairCount {
        self.config.pair_count()
    }

    /// How many pairs are still unmatched.
    pub fn pairs_left(&self) -> PairCount {
        self.pair_count() - self.score
    }

    pub fn resolve_delay(&self) -> Duration {
        self.config.resolve_delay
    }

    /// Whether a selection at `pos` would currently be accepted.
    pub fn can_select(&self, pos: Pos) -> bool {
        matches!(self.status, GameStatus::InProgress)
            && self.pending_pair.len() < 2
            && self.board.get(pos).is_some_and(Card::is_selectable)
    }

    /// The resolution the scheduler still owes the engine, if any.
    pub fn pending_resolution(&self) -> Option<ResolveTicket> {
        self.pending_resolve
    }

    /// Counter that advances with every scheduled pair and every reset.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// How long the session has been running, frozen once it completes.
    pub fn elapsed(&self) -> Duration {
        self.finished_in
            .unwrap_or_else(|| self.clock.now().duration_since(self.started_at))
    }

    /// Time the session took, captured once when the board completed.
    pub fn time_taken(&self) -> Option<Duration> {
        self.finished_in
    }

    /// Immutable view of the session for the presentation layer.
    pub fn snapshot(&self) -> Snapshot<S> {
        Snapshot {
            cards: self.board.clone(),
            score: self.score,
            status: self.status,
            elapsed_millis: self.finished_in.map(|taken| taken.as_millis() as u64),
        }
    }

    /// Applies a user selection event.
    ///
    /// Illegal targets are silently ignored rather than reported as errors:
    /// clicks race against the resolution timer and the UI cannot always
    /// withhold them in time.
    pub fn select(&mut self, pos: Pos) -> SelectOutcome {
        use SelectOutcome::*;

        if !matches!(self.status, GameStatus::InProgress) {
            return NoChange;
        }
        let Some(card) = self.board.get(pos) else {
            return NoChange;
        };
        if !card.is_selectable() {
            return NoChange;
        }
        if self.pending_pair.len() >= 2 {
            return NoChange;
        }

        self.board[pos].reveal();
        self.pending_pair.push(pos);
        log::trace!("revealed card at {pos}");

        if self.pending_pair.len() < 2 {
            return Revealed;
        }

        self.generation += 1;
        let ticket = ResolveTicket {
            generation: self.generation,
            due_at: self.clock.now() + self.config.resolve_delay,
        };
        self.pending_resolve = Some(ticket);
        self.status = GameStatus::Resolving;
        log::debug!(
            "pair at {:?} pending, resolution due in {:?}",
            self.pending_pair.as_slice(),
            self.config.resolve_delay
        );
        PairPending(ticket)
    }

    /// Resolves the pending pair once its observation delay has elapsed.
    pub fn resolve(&mut self, ticket: ResolveTicket) -> ResolveOutcome {
        use ResolveOutcome::*;

        if self.pending_resolve != Some(ticket) {
            log::debug!(
                "discarding stale resolution for generation {}",
                ticket.generation
            );
            return Stale;
        }

        let (first, second) = (self.pending_pair[0], self.pending_pair[1]);
        let matched = self.board[first].symbol() == self.board[second].symbol();

        if matched {
            self.board[first].lock_matched();
            self.board[second].lock_matched();
            self.score += 1;
            log::debug!("matched pair at ({first}, {second}), score {}", self.score);
        } else {
            self.board[first].conceal();
            self.board[second].conceal();
            log::debug!("no match at ({first}, {second}), flipped back");
        }
        self.pending_pair.clear();
        self.pending_resolve = None;

        if self.board.iter().all(Card::is_matched) {
            let time_taken = self.clock.now().duration_since(self.started_at);
            self.finished_in = Some(time_taken);
            self.status = GameStatus::Complete;
            log::debug!("session complete in {time_taken:?}");
            if let Some(hook) = self.on_complete.as_mut() {
                hook(time_taken);
            }
            Completed
        } else {
            self.status = GameStatus::InProgress;
            if matched { Matched } else { Mismatched }
        }
    }

    /// Starts a fresh session over the same symbol set.
    ///
    /// Any in-flight resolution belongs to a superseded generation and will
    /// resolve as stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending_resolve = None;
        self.pending_pair.clear();
        self.board = Deck::generate(&self.config, &mut self.rng).into_cards();
        self.score = 0;
        self.status = GameStatus::InProgress;
        self.started_at = self.clock.now();
        self.finished_in = None;
        log::debug!("session reset, reshuffled {} pairs", self.config.pair_count());
    }
}
