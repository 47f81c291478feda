mod core;
pub use self::core::*;

mod model;
pub use model::{LanguageModel, ModelError};
