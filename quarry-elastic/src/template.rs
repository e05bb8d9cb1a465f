//! Query templates read from disk.
//!
//! Template files are JSON documents with `{{name}}` placeholders. Files are
//! read once per process and kept in a shared cache; rendering substitutes
//! each placeholder with the JSON encoding of the matching value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use quarry_core::SearchError;
use serde::Serialize;
use serde_json::Value;

static TEMPLATES: OnceLock<Mutex<HashMap<PathBuf, Arc<str>>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<PathBuf, Arc<str>>> {
    TEMPLATES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Template source for `path`, reading the file on first use only.
pub fn load(path: &Path) -> Result<Arc<str>, SearchError> {
    let mut templates = cache()
        .lock()
        .map_err(|_| SearchError::other("template cache lock poisoned"))?;
    if let Some(source) = templates.get(path) {
        return Ok(source.clone());
    }

    let source: Arc<str> = std::fs::read_to_string(path)
        .map_err(SearchError::backend)?
        .into();
    tracing::debug!(path = %path.display(), "template cached");
    templates.insert(path.to_path_buf(), source.clone());
    Ok(source)
}

/// Whether `path` has already been read into the cache.
pub fn is_cached(path: &Path) -> bool {
    cache()
        .lock()
        .map(|templates| templates.contains_key(path))
        .unwrap_or(false)
}

/// Replace every `{{name}}` in `source` with the JSON encoding of `data[name]`.
///
/// Names may be dotted (`{{range.from}}`) to reach into nested objects.
pub fn render(source: &str, data: &Value) -> Result<String, SearchError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| SearchError::other("unterminated template placeholder"))?;
        let name = after[..end].trim();
        let value = lookup(data, name)
            .ok_or_else(|| SearchError::other(format!("template variable `{name}` is not defined")))?;
        out.push_str(&serde_json::to_string(value)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Load, render and parse the template at `path`.
pub fn render_file<D: Serialize>(path: &Path, data: &D) -> Result<Value, SearchError> {
    let source = load(path)?;
    let data = serde_json::to_value(data)?;
    let rendered = render(&source, &data)?;
    Ok(serde_json::from_str(&rendered)?)
}

fn lookup<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    name.split('.').try_fold(data, |value, key| value.get(key))
}
