//! Short service names and the scope URIs they stand for.

const GOOGLE_AUTH: &str = "https://www.googleapis.com/auth/";

/// Alias table: service name -> scope URI suffixes under `GOOGLE_AUTH`.
pub const SCOPE_CATALOG: &[(&str, &[&str])] = &[
    ("gmail", &["gmail.modify"]),
    ("gmail.readonly", &["gmail.readonly"]),
    ("drive", &["drive"]),
    ("drive.readonly", &["drive.readonly"]),
    ("calendar", &["calendar"]),
    ("calendar.readonly", &["calendar.readonly"]),
    ("contacts", &["contacts"]),
    ("contacts.readonly", &["contacts.readonly"]),
    ("directory.readonly", &["directory.readonly"]),
    ("tasks", &["tasks"]),
    ("tasks.readonly", &["tasks.readonly"]),
    ("sheets", &["spreadsheets"]),
    ("sheets.readonly", &["spreadsheets.readonly"]),
    ("docs", &["documents"]),
    ("docs.readonly", &["documents.readonly"]),
    ("slides", &["presentations"]),
    ("slides.readonly", &["presentations.readonly"]),
    ("userinfo.email", &["userinfo.email"]),
    ("userinfo.profile", &["userinfo.profile"]),
];

/// Tokens that expand to every URI in the catalog.
pub const WILDCARD_ALIASES: &[&str] = &["all", "*"];

/// Full scope URIs for a service alias, `None` when the alias is unknown.
pub fn lookup(alias: &str) -> Option<Vec<String>> {
    SCOPE_CATALOG
        .iter()
        .find(|(name, _)| *name == alias)
        .map(|(_, suffixes)| suffixes.iter().map(|s| format!("{GOOGLE_AUTH}{s}")).collect())
}

/// Every scope URI the catalog knows about, in table order (may repeat).
pub fn all_scopes() -> Vec<String> {
    SCOPE_CATALOG
        .iter()
        .flat_map(|(_, suffixes)| suffixes.iter())
        .map(|s| format!("{GOOGLE_AUTH}{s}"))
        .collect()
}
