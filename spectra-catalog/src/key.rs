//! Composite identity key for species sub-states.
//!
//! A species record is identified by its species id plus four orthogonal
//! sub-state dimensions: nuclear-spin isomer, vibrational state, hyperfine
//! component and electronic state. Any dimension may be unknown. Blank values
//! are normalised to `None` so that `""` and "absent" are the same key.

use serde::{Deserialize, Serialize};

/// `(species_id, nsi, vibstate, hfs, elecstate)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubStateKey {
    pub species_id: String,
    pub nsi: Option<String>,
    pub vibstate: Option<String>,
    pub hfs: Option<String>,
    pub elecstate: Option<String>,
}

/// How far an existing record is from a target key when it could be promoted
/// to it. Lower ranks are preferred.
///
/// The order is total: a record that only lacks the electronic state beats
/// one that only lacks the vibrational state, which beats one that lacks
/// both. Ties between equal ranks are broken by the caller (lowest row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PromotionRank {
    ElectronicOnly,
    VibrationalOnly,
    Both,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SubStateKey {
    pub fn new(
        species_id: impl Into<String>,
        nsi: Option<String>,
        vibstate: Option<String>,
        hfs: Option<String>,
        elecstate: Option<String>,
    ) -> Self {
        Self {
            species_id: species_id.into(),
            nsi: normalize(nsi),
            vibstate: normalize(vibstate),
            hfs: normalize(hfs),
            elecstate: normalize(elecstate),
        }
    }

    /// The key of a record whose vibrational, hyperfine and electronic
    /// dimensions are still undifferentiated.
    pub fn placeholder(species_id: impl Into<String>, nsi: Option<String>) -> Self {
        Self::new(species_id, nsi, None, None, None)
    }

    /// The placeholder key sharing this key's species id and isomer.
    pub fn placeholder_of(&self) -> Self {
        Self::placeholder(self.species_id.clone(), self.nsi.clone())
    }

    pub fn is_placeholder(&self) -> bool {
        self.vibstate.is_none() && self.hfs.is_none() && self.elecstate.is_none()
    }

    /// Whether `other` belongs to the same species and nuclear-spin isomer.
    pub fn same_isomer(&self, other: &SubStateKey) -> bool {
        self.species_id == other.species_id && self.nsi == other.nsi
    }

    /// Rank this key as a promotion candidate for `target`.
    ///
    /// A candidate must share species id, isomer and hyperfine component with
    /// the target and be a strict generalisation of it: every dimension in
    /// which they differ must be unknown on the candidate and known on the
    /// target. Returns `None` for equal keys and for keys that contradict the
    /// target.
    pub fn promotion_rank(&self, target: &SubStateKey) -> Option<PromotionRank> {
        if !self.same_isomer(target) || self.hfs != target.hfs {
            return None;
        }
        let vib = dimension_gap(&self.vibstate, &target.vibstate)?;
        let elec = dimension_gap(&self.elecstate, &target.elecstate)?;
        match (vib, elec) {
            (false, true) => Some(PromotionRank::ElectronicOnly),
            (true, false) => Some(PromotionRank::VibrationalOnly),
            (true, true) => Some(PromotionRank::Both),
            (false, false) => None,
        }
    }
}

/// `Some(false)` when equal, `Some(true)` when the candidate is unknown and
/// the target known, `None` when the two contradict each other.
fn dimension_gap(candidate: &Option<String>, target: &Option<String>) -> Option<bool> {
    match (candidate, target) {
        (a, b) if a == b => Some(false),
        (None, Some(_)) => Some(true),
        _ => None,
    }
}

impl std::fmt::Display for SubStateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dim = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "({}, nsi={}, vib={}, hfs={}, elec={})",
            self.species_id,
            dim(&self.nsi),
            dim(&self.vibstate),
            dim(&self.hfs),
            dim(&self.elecstate)
        )
    }
}
