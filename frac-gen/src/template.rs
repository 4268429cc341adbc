//! Textual substitution of rendered expression text into a renderer source template.
//!
//! The template is a complete source file for the external renderer with `<%= key %>`
//! placeholders where the expression, its derivative and the method selection are spliced in.
//! The engine only ever supplies strings; locating, building and running the produced source is
//! someone else's job.

/// Replaces every `<%= key %>` placeholder in `template` with its value from `vars`.
/// Placeholders with no matching key are left as they are.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("<%= {key} %>"), value);
    }
    result
}
