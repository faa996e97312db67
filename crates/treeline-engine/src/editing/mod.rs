//! The dual-representation text engine.
//!
//! Every node owns one [`TextEngine`] bound to one editable surface. While
//! idle the surface shows the formatted form with syntax hidden; focus
//! swaps in the raw canonical markup, and the cursor survives the swap by
//! resolving pointer coordinates against the formatted text first and then
//! translating the offset into canonical coordinates
//! ([`cursor::rendered_to_canonical`]).
//!
//! Module structure:
//!
//! - **`surface`**: the [`EditableSurface`] trait any host widget can
//!   satisfy, plus key event types and a headless implementation
//! - **`cursor`**: offset mapping between rendered and canonical text
//! - **`split`**: split-at-cursor with emphasis continuity and header
//!   inheritance
//! - **`trigger`**: mention trigger detection and acceptance
//! - **`engine`**: the per-node controller tying it all together

pub mod cursor;
pub mod engine;
pub mod split;
pub mod surface;
pub mod trigger;

pub use engine::{EditSession, KeyOutcome, TextEngine};
pub use split::{SplitResult, split_at};
pub use surface::{CaretRect, EditableSurface, HeadlessSurface, Key, KeyEvent, Point};
pub use trigger::{MAX_QUERY_LEN, TRIGGER_CHAR, TriggerContext};
