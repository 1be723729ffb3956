//! Shared CLI argument types

mod global;

pub use global::GlobalOptions;

/// How results and errors are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored, labelled fields for a terminal
    #[default]
    Pretty,
    /// Bare JSON; failures become `{"errors": [...]}`
    Json,
}
