pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS flowers (
    name TEXT PRIMARY KEY,
    care TEXT
);
"#;

/// Scalar function registered on every connection and used for all
/// case-insensitive comparisons of flower names.
pub const FOLD_CASE_FN: &str = "fold_case";
