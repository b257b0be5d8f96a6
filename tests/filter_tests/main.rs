//! Filter evaluator test suite

mod evaluate_tests;
