pub mod alphabet;
pub mod context;
pub mod structs;
pub mod util;
