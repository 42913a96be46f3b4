//! Process-level helpers shared by the binary and tests.

pub mod bootstrap;
