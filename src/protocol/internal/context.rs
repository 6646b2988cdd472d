//! Context Management and Session Handling
//!
//! This module will contain context management utilities migrated from:
//! - `src/transport/mcp/context.rs`
//!
//! # Migration Plan (Phase 2)
//!
//! - Preserve transport context management patterns
//! - Maintain session handling capabilities
//! - Keep connection lifecycle management

// Layer 1: Standard library imports
// (Will be added during Phase 2 migration)

// Layer 2: Third-party crate imports
// (Will be added during Phase 2 migration)

// Layer 3: Internal module imports
// (Will be added during Phase 2 migration)

// PHASE 1: Placeholder - actual implementation will be added in Phase 2
