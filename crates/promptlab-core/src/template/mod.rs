//! Prompt template handling: placeholder scanning, variable extraction,
//! name violations, compilation and "add new variable" insertion.
//!
//! Every operation here goes through [`placeholder::placeholders`], so the
//! parser and the compiler always agree on what a placeholder is.

pub mod compile;
pub mod extract;
pub mod insert;
pub mod placeholder;
pub mod violations;

pub use compile::{compile_input_text, compile_input_texts};
pub use extract::{extract_variables, extract_variables_multi, VariableSet};
pub use insert::{insert_new_variable, insert_placeholder, new_variable_name, InsertedVariable};
pub use placeholder::{classify_name, placeholders, NameKind, Placeholder};
pub use violations::{find_name_violations, find_name_violations_multi, NameViolations};
