pub mod pulse;
pub mod timer;
