//! Supplied [`ClaimChecker`](attest_core::traits::ClaimChecker)
//! implementations.

pub mod pattern;

pub use pattern::PatternChecker;
