pub mod member;
pub mod session;
pub mod workout;

pub use member::{ContractType, Member};
pub use session::{Session, SessionStatus, SessionType};
pub use workout::{Exercise, WorkoutLog, WorkoutSet, CARDIO_MARKER};
