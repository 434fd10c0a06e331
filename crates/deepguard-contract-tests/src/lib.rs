//! Contract fixture validation lives in `tests/`.
