//! Atomic bundle construction, submission, and settlement tracking
//!
//! This module covers the full bundle lifecycle:
//! - Transaction assembly and wire encoding
//! - Tip account selection from the relay pool
//! - Pre-submission simulation gating
//! - Settlement polling with timeout handling

pub mod assembler;
pub mod engine;
pub mod poller;
pub mod tip;


pub use assembler::TransactionAssembler;
pub use engine::BundleSubmissionEngine;
pub use poller::StatusPoller;
pub use tip::TipAccountSelector;
