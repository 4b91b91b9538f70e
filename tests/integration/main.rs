//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the laser core against
//! the simulated timer backend. All tests run on the host with no real
//! hardware required.

mod core_tests;
mod mock_hw;
mod settings_tests;
