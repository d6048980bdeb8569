pub mod color;
pub mod utils;

pub use color::ConsoleColors;
pub use utils::*;
