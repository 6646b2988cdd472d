//! Authentication Strategies
//!
//! This module contains different authentication strategy implementations
//! following the AuthenticationStrategy trait pattern.

pub mod apikey;
