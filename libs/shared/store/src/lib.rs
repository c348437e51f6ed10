pub mod table;

pub use table::{LockMap, Table};
