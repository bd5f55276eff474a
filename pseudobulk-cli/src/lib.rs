pub mod common;
pub mod input;
pub mod io;
pub mod run_aggregate;
pub mod run_simulate;
