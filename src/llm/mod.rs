// Answer service layer

pub mod prompt;
pub mod provider;
pub mod together;

pub use prompt::build_prompt;
pub use provider::*;
