//! Domain models for the Crop Advisory Platform

mod onboarding;
mod progress;
mod report;
mod risk;
mod stage;
mod summary;
mod user;

pub use onboarding::*;
pub use progress::*;
pub use report::*;
pub use risk::*;
pub use stage::*;
pub use summary::*;
pub use user::*;
