//! Prompt templates for buswise.
//!
//! Templates under `prompts/` are embedded at compile time with
//! `include_dir!` and rendered with MiniJinja. A template is addressed by its
//! path relative to `prompts/` with the `.md.jinja` (or `.jinja`) suffix
//! stripped, so `prompts/trip_planner.md.jinja` is `trip_planner`.
//!
//! Rendering is deterministic: the same context always yields the same
//! string, which is what lets the planner hand the exact prompt back to the
//! caller for debugging.

#![forbid(unsafe_code)]

use buswise_core::log_error;
use include_dir::{Dir, include_dir};
use minijinja::{Environment, Error as MiniJinjaError, Value as MJValue};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::path::Path;

/// Name of the trip planner instruction template.
pub const TRIP_PLANNER: &str = "trip_planner";

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/prompts");

/// Built once; immutable afterwards, so rendering needs no locking.
static GLOBAL_ENV: Lazy<Environment<'static>> = Lazy::new(build_environment);

/// Render a prompt template by name.
///
/// Values are inserted verbatim (no auto-escaping) and the result is trimmed.
///
/// # Errors
/// Returns an error if the template does not exist or rendering fails.
pub fn render_prompt<T: Serialize>(
    template_name: &str,
    context: &T,
) -> Result<String, MiniJinjaError> {
    let template = GLOBAL_ENV.get_template(template_name)?;
    let rendered = template.render(MJValue::from_serialize(context))?;
    Ok(trim_owned(rendered))
}

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    for file in PROMPTS_DIR.files() {
        let path = file.path();
        let Some(source) = file.contents_utf8() else {
            log_error!("prompts", path = ?path, "Prompt template is not valid UTF-8");
            continue;
        };

        if let Err(e) = env.add_template_owned(template_key(path), source) {
            log_error!("prompts", path = ?path, error = %e, "Failed to register prompt template");
        }
    }

    env
}

fn template_key(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let stem = normalized
        .strip_suffix(".md.jinja")
        .or_else(|| normalized.strip_suffix(".jinja"))
        .unwrap_or(&normalized);
    stem.to_owned()
}

fn trim_owned(s: String) -> String {
    let trimmed = s.trim();
    if trimmed.len() == s.len() {
        return s;
    }
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trip_planner_template_is_embedded() {
        assert!(GLOBAL_ENV.get_template(TRIP_PLANNER).is_ok());
        assert_eq!(template_key(Path::new("trip_planner.md.jinja")), TRIP_PLANNER);
    }

    #[test]
    fn renders_values_verbatim() {
        let context = json!({
            "start_location": "Majestic <Bus Stand> & Metro",
            "destination": "Koramangala {{ 5th block }}",
            "notes": ""
        });
        let prompt = render_prompt(TRIP_PLANNER, &context).unwrap();

        assert!(prompt.starts_with("You are an expert AI trip planner"));
        assert!(prompt.contains("Starting Location: Majestic <Bus Stand> & Metro\n"));
        assert!(prompt.contains("Destination: Koramangala {{ 5th block }}\n"));
        assert!(prompt.contains("User Preferences: \n"));
        assert!(prompt.ends_with('}'));
    }

    #[test]
    fn unknown_template_is_an_error() {
        assert!(render_prompt("no_such_prompt", &json!({})).is_err());
    }

    #[test]
    fn template_keys_strip_suffixes() {
        assert_eq!(template_key(Path::new("trip_planner.md.jinja")), "trip_planner");
        assert_eq!(template_key(Path::new("tools/fare.jinja")), "tools/fare");
    }
}
