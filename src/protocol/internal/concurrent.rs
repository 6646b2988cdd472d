//! Concurrent Processing Utilities
//!
//! This module will contain concurrent processing utilities migrated from:
//! - `src/base/jsonrpc/concurrent.rs`
//!
//! # Migration Plan (Phase 2)
//!
//! - Preserve concurrent message processing optimizations
//! - Maintain thread safety guarantees
//! - Keep performance characteristics for high-throughput scenarios

// Layer 1: Standard library imports
// (Will be added during Phase 2 migration)

// Layer 2: Third-party crate imports
// (Will be added during Phase 2 migration)

// Layer 3: Internal module imports
// (Will be added during Phase 2 migration)

// PHASE 1: Placeholder - actual implementation will be added in Phase 2
