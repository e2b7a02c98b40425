/// Turn bookkeeping for the monster subsystem.
///
/// A turn only advances when the player's command counts as a move; rejected
/// or informational commands never reach the AI loop.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Number of confirmed player turns so far.
    pub number: u64,

    /// Sequential identifier incremented for every random roll taken in a turn.
    ///
    /// Mixed into roll seeds so that two rolls by the same monster in the same
    /// turn draw different values.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roll_nonce: u64,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next confirmed turn and resets the roll counter.
    pub fn advance(&mut self) -> u64 {
        self.number += 1;
        self.roll_nonce = 0;
        self.number
    }

    /// Returns the next roll nonce for this turn.
    pub fn next_roll(&mut self) -> u64 {
        let nonce = self.roll_nonce;
        self.roll_nonce += 1;
        nonce
    }
}
