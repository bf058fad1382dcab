pub mod rollup;
pub mod session;

pub use rollup::{ClassSummary, ParticipantSummary, SessionReport};
pub use session::{ActiveParticipants, HistoryRecord, ParticipantRecord, SessionService};
