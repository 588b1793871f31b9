//! Species metadata taken from a node, used to name records and to build
//! new ones.

use spectra_catalog::*;
use spectra_node::{Atom, Molecule, Node, QueryResult};

/// What the node says about a species, independent of its sub-states.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesMetadata {
    pub species_id: String,
    /// First segment of every record name: the structural formula for
    /// molecules, `(mass number)(symbol)(charge)` for atoms.
    pub base_name: String,
    pub is_atom: bool,
    pub vamdc_species_id: Option<String>,
    pub stoichiometric_formula: Option<String>,
    pub ordinary_structural_formula: Option<String>,
    pub chemical_name: Option<String>,
    pub comment: Option<String>,
    pub resource_id: String,
    pub url: String,
}

impl SpeciesMetadata {
    pub fn from_molecule(molecule: &Molecule, node: &Node) -> Self {
        Self {
            species_id: molecule.species_id.clone(),
            base_name: molecule.display_formula().trim().to_string(),
            is_atom: false,
            vamdc_species_id: molecule.cross_reference_id().map(str::to_string),
            stoichiometric_formula: molecule.stoichiometric_formula.clone(),
            ordinary_structural_formula: molecule.ordinary_structural_formula.clone(),
            chemical_name: molecule.chemical_name.clone(),
            comment: molecule.comment.clone(),
            resource_id: node.identifier.clone(),
            url: species_url(node, &molecule.species_id),
        }
    }

    pub fn from_atom(atom: &Atom, node: &Node) -> Self {
        let name = atom_name(
            atom.mass_number.as_deref(),
            &atom.element_symbol,
            atom.ion_charge,
        );
        let formula = atom.element_formula();
        Self {
            species_id: atom.species_id.clone(),
            base_name: name.clone(),
            is_atom: true,
            vamdc_species_id: atom.cross_reference_id().map(str::to_string),
            stoichiometric_formula: Some(formula.clone()),
            ordinary_structural_formula: Some(formula),
            chemical_name: Some(name),
            comment: atom.comment.clone(),
            resource_id: node.identifier.clone(),
            url: species_url(node, &atom.species_id),
        }
    }

    /// Metadata for `species_id` if the result contains it.
    pub fn from_result(result: &QueryResult, species_id: &str, node: &Node) -> Option<Self> {
        if let Some(molecule) = result.molecules.get(species_id) {
            return Some(Self::from_molecule(molecule, node));
        }
        result
            .atoms
            .get(species_id)
            .map(|atom| Self::from_atom(atom, node))
    }

    /// Name of the record with the given identity key.
    pub fn record_name(&self, key: &SubStateKey) -> String {
        if self.is_atom {
            compose_name(&self.base_name, None, None, None)
        } else {
            name_for_key(&self.base_name, key)
        }
    }

    /// An insertable record for `key` built from this metadata alone.
    pub fn draft(&self, key: SubStateKey, status: Status) -> NewSpecies {
        NewSpecies {
            name: self.record_name(&key),
            key,
            vamdc_species_id: self.vamdc_species_id.clone(),
            stoichiometric_formula: self.stoichiometric_formula.clone(),
            ordinary_structural_formula: self.ordinary_structural_formula.clone(),
            chemical_name: self.chemical_name.clone(),
            comment: self.comment.clone(),
            resource_id: Some(self.resource_id.clone()),
            url: Some(self.url.clone()),
            recommendation: false,
            status,
        }
    }
}

/// Query URL that reproduces the data of one species.
pub fn species_url(node: &Node, species_id: &str) -> String {
    format!(
        "{}?LANG=VSS2&REQUEST=doQuery&FORMAT=XSAMS&QUERY=Select+*+where+SpeciesID%3D{}",
        node.sync_url(),
        numeric_species_id(species_id)
    )
}
