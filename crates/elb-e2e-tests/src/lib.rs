//! End-to-end tests for the ELB log loader live in `tests/`.
