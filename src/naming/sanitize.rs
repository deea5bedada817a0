//! Filename sanitization

use std::sync::OnceLock;

use regex::Regex;

fn forbidden() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap())
}

/// Delete every character that is illegal in a filename on common
/// filesystems. Nothing is substituted, and the result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    forbidden().replace_all(name, "").into_owned()
}
