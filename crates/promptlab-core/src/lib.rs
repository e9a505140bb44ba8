pub mod config;
pub mod debounce;
pub mod examples;
pub mod form;
pub mod run_name;
pub mod store;
pub mod template;

pub use debounce::Debouncer;
pub use form::{
    Blocker, CreateRunRequest, FormDescription, FormMode, OutputMetadata, PriorRun, RunForm,
};
pub use store::{InputValueStore, InputValues};
pub use template::{
    compile_input_text, extract_variables, extract_variables_multi, find_name_violations,
    NameViolations, VariableSet,
};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
