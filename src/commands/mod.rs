pub mod diff;
pub mod show;
pub mod sync;
