pub mod cell;
pub mod sample;
