/// Index of a card in the board's play order.
pub type Pos = usize;

/// Count type used for pair totals and scores.
pub type PairCount = u16;

/// Monotonic counter identifying one scheduled resolution.
pub type Generation = u64;

/// Bound alias for the opaque tokens the engine pairs up.
///
/// Symbols are only ever cloned and compared for equality; the engine never
/// inspects their structure.
pub trait Symbol: Clone + Eq {}

impl<T: Clone + Eq> Symbol for T {}
