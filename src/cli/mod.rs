pub mod estimate;
pub mod funds;
pub mod setup;
pub mod ui;
