//! # Markup
//!
//! Conversion between the document value (a markup string owned by the
//! external store) and the in-memory [`Surface`](crate::surface::Surface).
//!
//! - **`parser`**: lenient markup → surface tree. Never fails.
//! - **`serialize`**: surface tree → markup, the raw content handed to the
//!   change callback.
//! - **`normalize`**: canonical form used only for equality checks.
//! - **`style`**: ordered `style="..."` declaration lists.

pub mod cursor;
pub mod normalize;
pub mod parser;
pub mod serialize;
pub mod style;

pub use normalize::normalize;
pub use parser::parse_into;
pub use serialize::serialize;
