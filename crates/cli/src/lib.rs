// periodgrid CLI library
// Exposes the command internals for the binary and its integration tests.

pub mod cell_ref;
pub mod render;
pub mod session;
pub mod state_file;
pub mod verdict;
