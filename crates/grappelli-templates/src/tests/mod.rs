//! Scenario tests for the full parse, compile, render pipeline.
