//! End-to-end tests for the fault translation adapters live under `tests/`
