//! Centralized mocks and fixtures for testing
//!
//! This module provides reusable scripted adapters and configurations to
//! reduce duplication across test files.

pub mod adapters;
pub mod configs;
