//! Tests for the quality classification engine
