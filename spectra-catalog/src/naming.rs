//! Naming conventions for species records and transitions.
//!
//! Record names follow `name[;nsi][;state][;hfs]`. Absent or blank segments
//! are left out entirely and all whitespace is stripped, so
//! `compose_name("CO", None, Some("v=0"), None)` is `"CO;v=0"`.

use crate::key::SubStateKey;

/// Compose a record name from a base name and optional segments.
pub fn compose_name(base: &str, nsi: Option<&str>, state: Option<&str>, hfs: Option<&str>) -> String {
    let mut parts = vec![strip_blanks(base)];
    for segment in [nsi, state, hfs].into_iter().flatten() {
        let segment = strip_blanks(segment);
        if !segment.is_empty() {
            parts.push(segment);
        }
    }
    parts.join(";")
}

/// Compose the name of the record identified by `key`.
pub fn name_for_key(base: &str, key: &SubStateKey) -> String {
    let state = state_segment(key.elecstate.as_deref(), key.vibstate.as_deref());
    compose_name(base, key.nsi.as_deref(), state.as_deref(), key.hfs.as_deref())
}

/// The `state` segment: electronic and vibrational labels joined by a comma.
pub fn state_segment(elecstate: Option<&str>, vibstate: Option<&str>) -> Option<String> {
    let labels: Vec<&str> = [elecstate, vibstate]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if labels.is_empty() {
        None
    } else {
        Some(labels.join(","))
    }
}

/// Name of an atom or atomic ion: `(mass number)(symbol)(charge)`, e.g.
/// `13C+`, `Fe`, `56Fe2`.
pub fn atom_name(mass_number: Option<&str>, symbol: &str, charge: Option<i32>) -> String {
    let charge = match charge.unwrap_or(0) {
        0 => String::new(),
        1 => "+".to_string(),
        -1 => "-".to_string(),
        n => n.to_string(),
    };
    strip_blanks(&format!("{}{}{}", mass_number.unwrap_or(""), symbol, charge))
}

/// Node-local numeric part of a species id: `XCDMS-149` → `149`.
pub fn numeric_species_id(species_id: &str) -> &str {
    match species_id.split_once('-') {
        Some((_, rest)) => rest,
        None => species_id,
    }
}

fn strip_blanks(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
