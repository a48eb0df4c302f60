//! Inline `style` attribute rewriting.
//!
//! Which CSS properties survive the moderate level is a declarative table
//! consulted by [`filter_declarations`]; nothing else in the pipeline knows
//! property names.

/// What happens to one CSS declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRule {
    Keep,
    Drop,
}

/// Properties that carry meaning a reader would notice if lost.
/// Everything else (fonts, margins, `mso-*`) is layout noise.
const STYLE_TABLE: &[(&str, StyleRule)] = &[
    ("color", StyleRule::Keep),
    ("font-weight", StyleRule::Keep),
    ("font-style", StyleRule::Keep),
    ("text-decoration", StyleRule::Keep),
];

/// Look up a property name (case-insensitive). Unlisted properties drop.
pub fn rule_for(property: &str) -> StyleRule {
    STYLE_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|&(_, rule)| rule)
        .unwrap_or(StyleRule::Drop)
}

/// True if a class or style value carries the word-processor `mso` marker.
pub fn has_mso_marker(value: &str) -> bool {
    value
        .as_bytes()
        .windows(3)
        .any(|w| w.eq_ignore_ascii_case(b"mso"))
}

/// Keep only the declarations whose property the table keeps.
///
/// Declarations are re-emitted as `property:value` joined by `;`, which is
/// never longer than the input. Returns `None` when nothing survives.
pub fn filter_declarations(style: &str) -> Option<String> {
    let kept: Vec<String> = style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if value.is_empty() || rule_for(property) == StyleRule::Drop {
                return None;
            }
            Some(format!("{}:{}", property.to_ascii_lowercase(), value))
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(";"))
    }
}

/// The declaration a legacy `<font color=…>` turns into.
pub fn color_declaration(color: &str) -> String {
    format!("color:{}", color.trim())
}
