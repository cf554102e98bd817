//! Privacy protocol — role-gated PII masking and audit trail filtering.
//!
//! Raw property values stay untouched at rest; masking is applied at display
//! time against the live role, so a role switch takes effect on the next
//! render without refetching.

pub mod audit;
pub mod pii;

pub use audit::filter_logs;
pub use pii::{is_sensitive, mask, mask_property, masked_properties, MaskedProperty, MASK};
