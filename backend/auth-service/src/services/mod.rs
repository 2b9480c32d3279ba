/// Business logic services
pub mod account;
pub mod session;

pub use account::AccountService;
pub use session::{LoginOutcome, SessionService};
