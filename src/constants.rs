//! Constants shared across the compiler, CLI, and configuration layers.
//!
//! Defining them centrally keeps the directive syntax, file names, and
//! output defaults discoverable in one place.

/// Keyword that starts a directive line.
pub const DIRECTIVE_KEYWORD: &str = "#include";

/// Separator between a directive's reference and its condition.
///
/// The reference ends at the first occurrence; everything after it belongs to
/// the condition.
pub const CONDITION_SEPARATOR: &str = " if ";

/// Default name of the options parameter in the emitted function.
pub const DEFAULT_OPTIONS_IDENT: &str = "options";

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "tplinc.toml";

/// Environment variable that points at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "TPLINC_CONFIG";

/// Maximum Levenshtein distance for "did you mean" suggestions.
pub const SUGGESTION_MAX_DISTANCE: usize = 3;

/// Maximum number of "did you mean" suggestions shown for one reference.
pub const MAX_SUGGESTIONS: usize = 3;
