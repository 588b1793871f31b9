//! Typed records parsed from an XSAMS response.
//!
//! Everything here is immutable once parsed. Fields a node may leave out are
//! `Option`s; callers decide which ones they require.

use std::collections::BTreeMap;

/// Speed of light in cm/s divided by 1e6, i.e. MHz per cm^-1.
const MHZ_PER_WAVENUMBER: f64 = 29_979.245_8;
/// cm^-1 per kelvin (k_B / hc).
const WAVENUMBER_PER_KELVIN: f64 = 0.695_034_8;
/// cm^-1 per electron volt.
const WAVENUMBER_PER_EV: f64 = 8_065.544;

/// The parsed result of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Molecules keyed by species id.
    pub molecules: BTreeMap<String, Molecule>,
    /// Atoms and atomic ions keyed by species id.
    pub atoms: BTreeMap<String, Atom>,
    /// States of all species keyed by state id.
    pub states: BTreeMap<String, State>,
    /// Radiative transitions keyed by process id.
    pub radiative_transitions: BTreeMap<String, RadiativeTransition>,
    /// Value of the `vamdc-request-token` header (`node:uuid:method`).
    pub request_token: Option<String>,
    pub query_uuid: Option<String>,
}

impl QueryResult {
    pub fn state(&self, state_ref: &str) -> Option<&State> {
        self.states.get(state_ref)
    }

    /// Query-store identifier of the request that produced this result.
    pub fn uuid(&self) -> Option<&str> {
        self.query_uuid.as_deref()
    }

    /// No molecule or atom in the result.
    pub fn has_no_species(&self) -> bool {
        self.molecules.is_empty() && self.atoms.is_empty()
    }

    pub fn contains_species(&self, species_id: &str) -> bool {
        self.molecules.contains_key(species_id) || self.atoms.contains_key(species_id)
    }

    /// States belonging to one species.
    pub fn states_of<'a>(&'a self, species_id: &'a str) -> impl Iterator<Item = &'a State> + 'a {
        self.states
            .values()
            .filter(move |s| s.species_id.as_deref() == Some(species_id))
    }

    /// Species a transition belongs to: its explicit species reference, or
    /// else the owner of its upper state.
    pub fn species_of(&self, transition: &RadiativeTransition) -> Option<String> {
        transition.species_ref.clone().or_else(|| {
            transition
                .upper_state_ref
                .as_deref()
                .and_then(|r| self.state(r))
                .and_then(|s| s.species_id.clone())
        })
    }

    pub fn species_catalogue(&self) -> SpeciesCatalogue {
        SpeciesCatalogue {
            molecules: self.molecules.clone(),
            atoms: self.atoms.clone(),
        }
    }
}

/// The species a node offers, as returned by a species-list query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCatalogue {
    pub molecules: BTreeMap<String, Molecule>,
    pub atoms: BTreeMap<String, Atom>,
}

impl SpeciesCatalogue {
    pub fn species_ids(&self) -> impl Iterator<Item = &str> {
        self.molecules
            .keys()
            .chain(self.atoms.keys())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.molecules.len() + self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub species_id: String,
    pub vamdc_species_id: Option<String>,
    pub inchikey: Option<String>,
    pub stoichiometric_formula: Option<String>,
    pub ordinary_structural_formula: Option<String>,
    pub chemical_name: Option<String>,
    pub comment: Option<String>,
    pub partition_functions: Vec<PartitionFunctionBlock>,
}

impl Molecule {
    /// Cross-node identifier: the VAMDC species id, else the InChIKey.
    pub fn cross_reference_id(&self) -> Option<&str> {
        self.vamdc_species_id.as_deref().or(self.inchikey.as_deref())
    }

    /// Base name used for records of this molecule.
    pub fn display_formula(&self) -> &str {
        self.ordinary_structural_formula
            .as_deref()
            .or(self.stoichiometric_formula.as_deref())
            .unwrap_or(&self.species_id)
    }
}

/// One tabulated partition function, optionally for a single nuclear-spin
/// isomer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionFunctionBlock {
    pub nsi: Option<String>,
    pub temperatures: Vec<f64>,
    pub values: Vec<f64>,
}

impl PartitionFunctionBlock {
    /// `(temperature, value)` pairs. Surplus entries in the longer list are
    /// dropped.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.temperatures
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    pub species_id: String,
    pub vamdc_species_id: Option<String>,
    pub inchikey: Option<String>,
    pub element_symbol: String,
    pub nuclear_charge: Option<u32>,
    pub mass_number: Option<String>,
    pub ion_charge: Option<i32>,
    pub comment: Option<String>,
}

impl Atom {
    pub fn cross_reference_id(&self) -> Option<&str> {
        self.vamdc_species_id.as_deref().or(self.inchikey.as_deref())
    }

    /// Element symbol followed by the nuclear charge, e.g. `C6`.
    pub fn element_formula(&self) -> String {
        match self.nuclear_charge {
            Some(z) => format!("{}{}", self.element_symbol, z),
            None => self.element_symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub id: String,
    pub species_id: Option<String>,
    pub energy: Option<f64>,
    /// Unit of `energy` as written in the document (`1/cm` when absent).
    pub energy_unit: Option<String>,
    pub total_statistical_weight: Option<f64>,
    pub nsi_name: Option<String>,
    /// State id of the lowest-energy state of this state's isomer.
    pub nsi_lowest_energy_ref: Option<String>,
    pub quantum_numbers: QuantumNumbers,
}

impl State {
    /// Energy converted to cm^-1. `None` when absent or in an unknown unit.
    pub fn energy_wavenumber(&self) -> Option<f64> {
        let energy = self.energy?;
        let unit = self
            .energy_unit
            .as_deref()
            .unwrap_or("1/cm")
            .trim()
            .to_ascii_lowercase();
        let factor = match unit.as_str() {
            "1/cm" | "cm-1" | "cm^-1" => 1.0,
            "mhz" => 1.0 / MHZ_PER_WAVENUMBER,
            "ghz" => 1_000.0 / MHZ_PER_WAVENUMBER,
            "k" => WAVENUMBER_PER_KELVIN,
            "ev" => WAVENUMBER_PER_EV,
            _ => return None,
        };
        Some(energy * factor)
    }

    /// The named nuclear-spin isomer, if any. Blank names count as none.
    pub fn nsi(&self) -> Option<&str> {
        self.nsi_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Quantum numbers of a state, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantumNumbers {
    /// Case identifier (`dcs`, `asymos`, ...) for molecular states.
    pub case: Option<String>,
    pub values: Vec<(String, String)>,
}

impl QuantumNumbers {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.values.push((label.into(), value.into()));
    }

    /// Vibrational quantum numbers (`v`, `v1`, `v2`, ...) sorted by label.
    pub fn vibrational(&self) -> Vec<(&str, &str)> {
        let mut vib: Vec<(&str, &str)> = self
            .values
            .iter()
            .filter(|(l, _)| is_vibrational_label(l))
            .map(|(l, v)| (l.as_str(), v.as_str()))
            .collect();
        vib.sort();
        vib
    }

    /// `v=0` or `v1=0,v2=1`; `None` for states without vibrational labels.
    pub fn vibstate(&self) -> Option<String> {
        let vib = self.vibrational();
        if vib.is_empty() {
            return None;
        }
        Some(
            vib.iter()
                .map(|(l, v)| format!("{l}={v}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    pub fn elec_state_label(&self) -> Option<&str> {
        self.get("ElecStateLabel")
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// All quantum numbers as `label=value` joined by `;`.
    pub fn qn_string(&self) -> String {
        self.values
            .iter()
            .map(|(l, v)| format!("{l}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// `v` followed by nothing or by digits.
pub fn is_vibrational_label(label: &str) -> bool {
    match label.strip_prefix('v') {
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiativeTransition {
    pub id: String,
    pub species_ref: Option<String>,
    pub upper_state_ref: Option<String>,
    pub lower_state_ref: Option<String>,
    pub frequency: Option<f64>,
    /// Unit of `frequency` as written in the document (`MHz` when absent).
    pub frequency_unit: Option<String>,
    pub frequency_accuracy: Option<f64>,
    pub einstein_a: Option<f64>,
    pub process_classes: Vec<String>,
}

impl RadiativeTransition {
    /// Frequency converted to MHz. `None` when absent or in an unknown unit.
    pub fn frequency_mhz(&self) -> Option<f64> {
        let frequency = self.frequency?;
        let unit = self
            .frequency_unit
            .as_deref()
            .unwrap_or("MHz")
            .trim()
            .to_ascii_lowercase();
        let factor = match unit.as_str() {
            "mhz" => 1.0,
            "ghz" => 1_000.0,
            "khz" => 1e-3,
            "hz" => 1e-6,
            "1/cm" | "cm-1" => MHZ_PER_WAVENUMBER,
            _ => return None,
        };
        Some(frequency * factor)
    }

    /// Accuracy scaled with the same factor as the frequency.
    pub fn accuracy_mhz(&self) -> Option<f64> {
        let accuracy = self.frequency_accuracy?;
        match (self.frequency, self.frequency_mhz()) {
            (Some(raw), Some(mhz)) if raw != 0.0 => Some(accuracy * mhz / raw),
            _ => Some(accuracy),
        }
    }

    /// The hyperfine tag: the first process-class code starting with `hyp`.
    pub fn hyperfine_tag(&self) -> Option<&str> {
        self.process_classes
            .iter()
            .map(|c| c.trim())
            .find(|c| c.starts_with("hyp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vibrational_labels() {
        assert!(is_vibrational_label("v"));
        assert!(is_vibrational_label("v12"));
        assert!(!is_vibrational_label("vib"));
        assert!(!is_vibrational_label("J"));
    }

    #[test]
    fn vibstate_is_sorted() {
        let mut qn = QuantumNumbers::default();
        qn.push("J", "1");
        qn.push("v2", "1");
        qn.push("v1", "0");
        assert_eq!(qn.vibstate().as_deref(), Some("v1=0,v2=1"));
        assert_eq!(qn.qn_string(), "J=1;v2=1;v1=0");
    }

    #[test]
    fn energy_units() {
        let state = State {
            energy: Some(29_979.245_8),
            energy_unit: Some("MHz".to_string()),
            ..Default::default()
        };
        assert!((state.energy_wavenumber().unwrap() - 1.0).abs() < 1e-12);
        let state = State {
            energy: Some(2.0),
            ..Default::default()
        };
        assert_eq!(state.energy_wavenumber(), Some(2.0));
        let state = State {
            energy: Some(2.0),
            energy_unit: Some("furlong".to_string()),
            ..Default::default()
        };
        assert_eq!(state.energy_wavenumber(), None);
    }

    #[test]
    fn hyperfine_tag_is_first_hyp_code() {
        let t = RadiativeTransition {
            process_classes: vec!["elas".into(), "hyp1".into(), "hyp2".into()],
            ..Default::default()
        };
        assert_eq!(t.hyperfine_tag(), Some("hyp1"));
    }

    #[test]
    fn ghz_frequencies_are_scaled() {
        let t = RadiativeTransition {
            frequency: Some(115.2712018),
            frequency_unit: Some("GHz".into()),
            frequency_accuracy: Some(0.0000005),
            ..Default::default()
        };
        assert!((t.frequency_mhz().unwrap() - 115_271.2018).abs() < 1e-6);
        assert!((t.accuracy_mhz().unwrap() - 0.0005).abs() < 1e-12);
    }
}
