pub mod error;
pub mod llm;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ChatError, ChatResult};
