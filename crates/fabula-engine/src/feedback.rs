//! Feedback template rendering.
//!
//! Templates are data-supplied strings with `{var}` placeholders. Rendering
//! is plain substitution; anything smarter belongs to the templating
//! collaborator upstream.

use std::collections::BTreeMap;

/// Replace every `{key}` placeholder with its value.
///
/// Placeholders without a value are left verbatim, so an authoring mistake
/// shows up in the output instead of vanishing.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        let placeholder = format!("{{{key}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }
    rendered
}

/// Whether a template references a placeholder.
pub fn wants(template: &str, key: &str) -> bool {
    template.contains(&format!("{{{key}}}"))
}

/// Uppercase the first character. Failure feedback is capitalized because
/// templates routinely start with a variable.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
