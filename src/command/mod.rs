pub mod align;
pub mod consensus;
pub mod typing;

pub use align::AlignCMD;

pub use consensus::Consensus;
pub use consensus::ConsensusCMD;
pub use consensus::ConsensusParams;

pub use typing::Typing;
pub use typing::TypingCMD;
pub use typing::TypingParams;
