//! Property-based tests for formula compilation and evaluation.
