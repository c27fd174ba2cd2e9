pub mod attempt;
pub mod camp;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod crn;
pub mod session;

pub use attempt::{AttemptError, run_attempt};
pub use camp::{AttemptResult, CampState, Campaign, StepOutcome, camp};
pub use cancel::{CancelHandle, CancelSignal, cancel_channel};
pub use classify::classify;
pub use config::{CampConfig, ConfigError, ConfigLoader};
pub use crn::{Crn, CrnBatch, CrnError, parse_crns};
pub use session::{PageSession, SessionError};
