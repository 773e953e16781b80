pub mod config;
pub mod markup;
pub mod pipeline;
pub mod placeholder;
pub mod progress;
pub mod segment;
pub mod source;
pub mod substitute;
pub mod table;
pub mod workbook;

pub use placeholder::extract;
pub use segment::{segment, LineRecord};
pub use substitute::{substitute, substitute_with_report, Outcome, Substitution};
pub use table::{ImportEvent, TableWarning, TranslationEntry, TranslationTable};
