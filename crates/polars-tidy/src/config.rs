pub(crate) const VERBOSE: &str = "POLARS_VERBOSE";
pub(crate) const ROW_INDEX_NAME: &str = "POLARS_TIDY_ROW_INDEX_NAME";

/// Name of the hidden column that carries original row positions through the
/// group-partition executor.
pub const DEFAULT_ROW_INDEX_NAME: &str = "__original_row_idx__";

pub fn verbose() -> bool {
    std::env::var(VERBOSE).as_deref().unwrap_or("") == "1"
}

pub fn row_index_name() -> String {
    std::env::var(ROW_INDEX_NAME)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ROW_INDEX_NAME.to_string())
}

/// Prints a log message if verbose logging has been enabled.
pub(crate) fn verbose_print<F: FnOnce() -> String>(create_log_message: F) {
    if verbose() {
        eprintln!("{}", create_log_message())
    }
}
