pub mod booking;
pub mod conflict;
pub mod lifecycle;

pub use booking::*;
pub use conflict::*;
pub use lifecycle::*;
