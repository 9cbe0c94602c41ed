//! Template expansion

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{Result, Vars};

/// `@name@` pairs, matched left to right without overlap.
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([^@]*)@").unwrap());

/// Expand `template` with `vars`.
///
/// Unknown variables expand to the empty string. An unpaired `@` is kept.
pub fn render_str(template: &str, vars: &Vars) -> String {
    let mut out = String::with_capacity(template.len());
    for line in template.lines() {
        let expanded = VARIABLE.replace_all(line.trim_end(), |caps: &Captures<'_>| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.to_string(),
                None => {
                    tracing::warn!(variable = name, "template variable has no value");
                    String::new()
                }
            }
        });
        out.push_str(&expanded);
        out.push('\n');
    }
    out
}

/// Expand the template file at `path`.
pub fn render_file(path: &Path, vars: &Vars) -> Result<String> {
    let template = pxe_fs::io::read_text(path)?;
    tracing::debug!(template = %path.display(), "rendering template");
    Ok(render_str(&template, vars))
}

/// Expand the template file at `template` and write the result to `out`.
pub fn render_to_file(template: &Path, out: &Path, vars: &Vars) -> Result<()> {
    let rendered = render_file(template, vars)?;
    pxe_fs::io::write_text(out, &rendered)?;
    Ok(())
}
