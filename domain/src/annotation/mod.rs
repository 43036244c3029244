//! Reply annotations embedded by the model.
//!
//! The model marks corrections and encouragement inline with tag pairs.
//! [`markers`] documents the grammar, [`parsing`] extracts it into the
//! types in [`entities`].
//!
//! ```text
//! [CORRECTION]original|corrected|explanation[/CORRECTION]
//! [ALTERNATIVE]original|corrected|explanation[/ALTERNATIVE]
//! [ENCOURAGEMENT]message[/ENCOURAGEMENT]
//! ```

pub mod entities;
pub mod markers;
pub mod parsing;
