//! Primary-key index test suite
