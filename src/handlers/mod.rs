pub mod health;
pub mod intake;

pub use health::*;
pub use intake::*;
