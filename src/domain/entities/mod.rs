pub mod working_copy;

pub use working_copy::{WorkingCopy, WorkingCopySettings};
