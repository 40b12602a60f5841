//! Consolidated test modules.
//!
//! This module contains end-to-end tests that exercise the full
//! config -> collector -> report path against mock HTTP services and
//! on-disk usage logs.
