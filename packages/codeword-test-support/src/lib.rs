//! Test support utilities shared by the codeword backend's unit and
//! integration tests.

pub mod test_logging;
pub mod unique_helpers;
