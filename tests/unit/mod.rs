/// Unit tests for the pure calendar and domain layers
mod basic_tests;
mod calendar_tests;
