// Migration utilities and helpers

pub const INITIAL_SCHEMA: &str = include_str!("../../../migrations/001_kv_store.sql");

pub fn get_migrations() -> Vec<(&'static str, &'static str)> {
    vec![("001", INITIAL_SCHEMA)]
}

/// Split a migration file into individual statements.
///
/// `--` comment lines are removed before splitting on `;`, so a semicolon
/// inside a comment never starts a new statement.
pub fn statements(sql: &str) -> Vec<String> {
    let code: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}
