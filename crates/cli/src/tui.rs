pub mod draw;
pub mod events;
pub mod input;
pub mod run;
pub mod scheduler;
pub mod state;

pub use run::run_tui;
