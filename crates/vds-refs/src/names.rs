//! Ref name validation following git-style conventions.
//!
//! A valid ref name is either `HEAD` or `refs/<component>[/<component>...]`
//! where the part after `refs/`:
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not end with `.` or `.lock`
//! - Must not contain empty components or components starting with `.`

use crate::error::{RefError, Result};
use crate::types::HEAD;

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidRefName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a canonical ref name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use vds_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("HEAD").is_ok());
/// assert!(validate_ref_name("refs/tags/v1.0").is_ok());
/// assert!(validate_ref_name("refs/tags/bad..name").is_err());
/// assert!(validate_ref_name("main").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name == HEAD {
        return Ok(());
    }
    let rest = name
        .strip_prefix("refs/")
        .ok_or_else(|| invalid(name, "must be HEAD or start with 'refs/'"))?;

    if let Some(ch) = FORBIDDEN_CHARS.iter().find(|ch| rest.contains(**ch)) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }
    if rest.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if rest.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if rest.ends_with('.') {
        return Err(invalid(name, "must not end with '.'"));
    }
    if rest.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }
    for component in rest.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }
    Ok(())
}
