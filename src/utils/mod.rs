//! Small pure helpers shared by the bundler.

pub mod path;
pub mod plural;

pub use plural::plural_count;
