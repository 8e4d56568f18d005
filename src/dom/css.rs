//! Inline `style=""` handling.
//!
//! The synchronizer writes a handful of box properties (`height`, `top`,
//! `margin-top`, `margin-right`, `overflow`) straight into element style
//! attributes, the way jQuery's `.css()` does. Declarations keep their
//! original order so untouched properties survive a rewrite.

/// One `property: value` pair.
pub type Declaration = (String, String);

/// Parse an inline `style="..."` attribute value into ordered declarations.
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    let mut decls = Vec::new();
    for decl in style.split(';') {
        let parts: Vec<&str> = decl.splitn(2, ':').collect();
        if parts.len() != 2 {
            continue;
        }
        let prop = parts[0].trim().to_ascii_lowercase();
        let val = parts[1].trim();
        if prop.is_empty() {
            continue;
        }
        decls.push((prop, val.to_string()));
    }
    decls
}

/// Last value declared for `property` (later declarations win).
pub fn lookup<'a>(decls: &'a [Declaration], property: &str) -> Option<&'a str> {
    decls
        .iter()
        .rev()
        .find(|(p, _)| p == property)
        .map(|(_, v)| v.as_str())
}

/// Replace `property` in place, or append it.
pub fn upsert(decls: &mut Vec<Declaration>, property: &str, value: &str) {
    let property = property.to_ascii_lowercase();
    match decls.iter().position(|(p, _)| *p == property) {
        Some(pos) => {
            decls[pos].1 = value.to_string();
            let mut seen = 0;
            decls.retain(|(p, _)| {
                if *p == property {
                    seen += 1;
                    seen == 1
                } else {
                    true
                }
            });
        }
        None => decls.push((property, value.to_string())),
    }
}

pub fn serialize(decls: &[Declaration]) -> String {
    decls
        .iter()
        .map(|(p, v)| format!("{}: {}", p, v))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format a pixel length the way it is written back into `style`.
pub fn px(value: f32) -> String {
    format!("{}px", value)
}
