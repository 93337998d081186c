//! Default SQL naming convention: `ParentObject` maps to `PARENT_OBJECT`,
//! foreign-key columns are prefixed with `IDFK_`.

pub const FOREIGN_KEY_PREFIX: &str = "IDFK_";

/// Converts a Pascal- or camel-case name to upper snake case.
pub fn to_upper_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    let mut chars = name.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_uppercase()
            && let Some(p) = prev
        {
            let next_is_lower = chars.peek().is_some_and(|n| n.is_lowercase());
            if p.is_lowercase() || p.is_ascii_digit() || (p.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        if ch == '-' || ch == ' ' {
            out.push('_');
        } else {
            out.extend(ch.to_uppercase());
        }
        prev = Some(ch);
    }
    out
}

pub fn table_name(entity: &str) -> String {
    to_upper_snake(entity)
}

pub fn column_name(property: &str) -> String {
    to_upper_snake(property)
}

pub fn foreign_key_column(property: &str) -> String {
    format!("{FOREIGN_KEY_PREFIX}{}", to_upper_snake(property))
}

pub fn link_table_name(owner_table: &str, property: &str) -> String {
    format!("{owner_table}_{}", to_upper_snake(property))
}
