pub mod event;
pub mod score;

pub use event::{Event, UserId};
pub use score::ScoreSummary;
