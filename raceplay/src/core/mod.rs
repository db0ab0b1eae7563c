pub mod clock;
pub mod handle_race;
pub mod scheduler;
pub mod session;
pub mod timer;
