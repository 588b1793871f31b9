//! XSAMS document parser.
//!
//! Reads the subset of XSAMS the synchroniser needs: molecular and atomic
//! species, their states and quantum numbers, partition functions and
//! radiative transitions. Namespace prefixes are ignored; elements are
//! matched on their local names and their position in the element path.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::NodeError;
use crate::result::*;

/// Parse an XSAMS document from a string.
pub fn parse_xsams_str(xml: &str) -> Result<QueryResult, NodeError> {
    parse_xsams(xml.as_bytes())
}

/// Parse an XSAMS document.
pub fn parse_xsams<R: BufRead>(reader: R) -> Result<QueryResult, NodeError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parser = Parser::default();
    let mut saw_root = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                saw_root |= local_name(e) == "XSAMSData";
                parser.start(e)?;
            }
            Event::Empty(ref e) => {
                saw_root |= local_name(e) == "XSAMSData";
                parser.start(e)?;
                parser.end();
            }
            Event::Text(ref e) => {
                let text = e.unescape()?;
                parser.text.push_str(&text);
            }
            Event::CData(ref e) => {
                parser.text.push_str(&String::from_utf8_lossy(e));
            }
            Event::End(_) => parser.end(),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(NodeError::invalid_xsams("missing XSAMSData root element"));
    }
    Ok(parser.result)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, NodeError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
        }
    }
    Ok(None)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn parse_list(text: &str) -> Vec<f64> {
    text.split_whitespace().filter_map(parse_number).collect()
}

/// Element containing the current one, `n` levels up.
fn ancestor(path: &[String], n: usize) -> &str {
    path.len()
        .checked_sub(n + 1)
        .and_then(|i| path.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

fn within(path: &[String], name: &str) -> bool {
    path.iter().any(|p| p == name)
}

/// Ion-independent part of an atom (element and isotope).
#[derive(Default)]
struct AtomContext {
    element_symbol: String,
    nuclear_charge: Option<u32>,
    mass_number: Option<String>,
}

#[derive(Default)]
struct Parser {
    result: QueryResult,
    path: Vec<String>,
    text: String,
    /// `units` attribute of the innermost open `Value`-like element.
    units: Option<String>,
    molecule: Option<Molecule>,
    atom: AtomContext,
    ion: Option<Atom>,
    state: Option<State>,
    partition_function: Option<PartitionFunctionBlock>,
    transition: Option<RadiativeTransition>,
    transition_count: usize,
}

impl Parser {
    fn current_species_id(&self) -> Option<String> {
        self.molecule
            .as_ref()
            .map(|m| m.species_id.clone())
            .or_else(|| self.ion.as_ref().map(|a| a.species_id.clone()))
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), NodeError> {
        let name = local_name(e);
        self.text.clear();

        match name.as_str() {
            "Molecule" => {
                self.molecule = Some(Molecule {
                    species_id: attribute(e, "speciesID")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            "Atom" => self.atom = AtomContext::default(),
            "Isotope" => self.atom.mass_number = None,
            "Ion" => {
                self.ion = Some(Atom {
                    species_id: attribute(e, "speciesID")?.unwrap_or_default(),
                    element_symbol: self.atom.element_symbol.clone(),
                    nuclear_charge: self.atom.nuclear_charge,
                    mass_number: self.atom.mass_number.clone(),
                    ..Default::default()
                });
            }
            "MolecularState" | "AtomicState" => {
                self.state = Some(State {
                    id: attribute(e, "stateID")?.unwrap_or_default(),
                    species_id: self.current_species_id(),
                    ..Default::default()
                });
            }
            "NuclearSpinIsomer" => {
                if let Some(state) = self.state.as_mut() {
                    state.nsi_lowest_energy_ref = attribute(e, "lowestEnergyStateRef")?;
                }
            }
            "Case" => {
                if let Some(state) = self.state.as_mut() {
                    state.quantum_numbers.case = attribute(e, "caseID")?;
                }
            }
            "PartitionFunction" if self.molecule.is_some() => {
                self.partition_function = Some(PartitionFunctionBlock::default());
            }
            "RadiativeTransition" => {
                self.transition_count += 1;
                let id = attribute(e, "id")?
                    .unwrap_or_else(|| format!("P{}", self.transition_count));
                self.transition = Some(RadiativeTransition {
                    id,
                    ..Default::default()
                });
            }
            "Value" | "T" | "Q" => self.units = attribute(e, "units")?,
            _ => {}
        }

        self.path.push(name);
        Ok(())
    }

    fn end(&mut self) {
        let text = std::mem::take(&mut self.text);
        let Some(name) = self.path.last().cloned() else {
            return;
        };

        if self.transition.is_some() {
            self.end_in_transition(&name, &text);
        } else if self.state.is_some() {
            self.end_in_state(&name, &text);
        } else if self.partition_function.is_some() {
            self.end_in_partition_function(&name, &text);
        } else if self.molecule.is_some() {
            self.end_in_molecule(&name, &text);
        } else if within(&self.path, "Atom") {
            self.end_in_atom(&name, &text);
        }

        self.path.pop();
    }

    fn end_in_molecule(&mut self, name: &str, text: &str) {
        let parent = ancestor(&self.path, 1).to_string();
        let Some(molecule) = self.molecule.as_mut() else {
            return;
        };
        match (name, parent.as_str()) {
            ("Value", "OrdinaryStructuralFormula") => {
                molecule.ordinary_structural_formula = non_empty(text)
            }
            ("StoichiometricFormula", _) => molecule.stoichiometric_formula = non_empty(text),
            ("Value", "ChemicalName") => molecule.chemical_name = non_empty(text),
            ("InChIKey", _) => molecule.inchikey = non_empty(text),
            ("VAMDCSpeciesID", _) => molecule.vamdc_species_id = non_empty(text),
            ("Comment", "MolecularChemicalSpecies") => molecule.comment = non_empty(text),
            ("Molecule", _) => {
                if let Some(molecule) = self.molecule.take() {
                    self.result
                        .molecules
                        .insert(molecule.species_id.clone(), molecule);
                }
            }
            _ => {}
        }
    }

    fn end_in_partition_function(&mut self, name: &str, text: &str) {
        let parent = ancestor(&self.path, 1).to_string();
        let Some(pf) = self.partition_function.as_mut() else {
            return;
        };
        match (name, parent.as_str()) {
            ("DataList", "T") => pf.temperatures = parse_list(text),
            ("DataList", "Q") => pf.values = parse_list(text),
            ("Name", "NuclearSpinIsomer") => pf.nsi = non_empty(text),
            ("PartitionFunction", _) => {
                if let (Some(pf), Some(molecule)) =
                    (self.partition_function.take(), self.molecule.as_mut())
                {
                    molecule.partition_functions.push(pf);
                }
            }
            _ => {}
        }
    }

    fn end_in_atom(&mut self, name: &str, text: &str) {
        let parent = ancestor(&self.path, 1).to_string();
        match (name, parent.as_str()) {
            ("ElementSymbol", "ChemicalElement") => {
                self.atom.element_symbol = text.trim().to_string()
            }
            ("NuclearCharge", "ChemicalElement") => {
                self.atom.nuclear_charge = text.trim().parse().ok()
            }
            ("MassNumber", "IsotopeParameters") => self.atom.mass_number = non_empty(text),
            ("IonCharge", "Ion") => {
                if let Some(ion) = self.ion.as_mut() {
                    ion.ion_charge = text.trim().parse().ok();
                }
            }
            ("InChIKey", "Ion") => {
                if let Some(ion) = self.ion.as_mut() {
                    ion.inchikey = non_empty(text);
                }
            }
            ("VAMDCSpeciesID", "Ion") => {
                if let Some(ion) = self.ion.as_mut() {
                    ion.vamdc_species_id = non_empty(text);
                }
            }
            ("Comment", "Ion") => {
                if let Some(ion) = self.ion.as_mut() {
                    ion.comment = non_empty(text);
                }
            }
            ("Ion", _) => {
                if let Some(ion) = self.ion.take() {
                    self.result.atoms.insert(ion.species_id.clone(), ion);
                }
            }
            _ => {}
        }
    }

    fn end_in_state(&mut self, name: &str, text: &str) {
        let parent = ancestor(&self.path, 1).to_string();
        let units = self.units.clone();
        let in_case = within(&self.path, "Case");
        let in_atomic_qns = within(&self.path, "AtomicQuantumNumbers");
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match (name, parent.as_str()) {
            ("Value", "StateEnergy") => {
                state.energy = parse_number(text);
                state.energy_unit = units;
            }
            ("TotalStatisticalWeight", _) | ("StatisticalWeight", "AtomicNumericalData") => {
                state.total_statistical_weight = parse_number(text);
            }
            ("Name", "NuclearSpinIsomer") => state.nsi_name = non_empty(text),
            ("MolecularState" | "AtomicState", _) => {
                if let Some(state) = self.state.take() {
                    self.result.states.insert(state.id.clone(), state);
                }
            }
            // Quantum numbers are the leaf children of `QNs` in a case, or
            // of `AtomicQuantumNumbers`.
            (label, "QNs") if in_case => {
                if let Some(value) = non_empty(text) {
                    state.quantum_numbers.push(label, value);
                }
            }
            (label, "AtomicQuantumNumbers") if in_atomic_qns => {
                if let Some(value) = non_empty(text) {
                    state.quantum_numbers.push(label, value);
                }
            }
            _ => {}
        }
    }

    fn end_in_transition(&mut self, name: &str, text: &str) {
        let parent = ancestor(&self.path, 1).to_string();
        let grandparent = ancestor(&self.path, 2).to_string();
        let units = self.units.clone();
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        match (name, parent.as_str()) {
            ("SpeciesRef", _) => transition.species_ref = non_empty(text),
            ("UpperStateRef", _) => transition.upper_state_ref = non_empty(text),
            ("LowerStateRef", _) => transition.lower_state_ref = non_empty(text),
            ("Value", "Frequency") => {
                transition.frequency = parse_number(text);
                transition.frequency_unit = units;
            }
            ("Accuracy", "Frequency") => {
                if let Some(accuracy) = parse_number(text) {
                    transition.frequency_accuracy = Some(accuracy);
                }
            }
            // Structured accuracy (`<Accuracy><Statistical>..</Statistical>`)
            (_, "Accuracy") if grandparent == "Frequency" => {
                if transition.frequency_accuracy.is_none() {
                    transition.frequency_accuracy = parse_number(text);
                }
            }
            ("Value", "TransitionProbabilityA") => transition.einstein_a = parse_number(text),
            ("Code", "ProcessClass") => {
                if let Some(code) = non_empty(text) {
                    transition.process_classes.push(code);
                }
            }
            ("RadiativeTransition", _) => {
                if let Some(transition) = self.transition.take() {
                    self.result
                        .radiative_transitions
                        .insert(transition.id.clone(), transition);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// CO with two vibrational states, a partition function and two lines.
    pub const CO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<XSAMSData xmlns="http://vamdc.org/xml/xsams/1.0" xmlns:case="http://vamdc.org/xml/xsams/1.0/cases/dcs">
  <Species>
    <Molecules>
      <Molecule speciesID="XCDMS-28">
        <MolecularChemicalSpecies>
          <OrdinaryStructuralFormula><Value>CO</Value></OrdinaryStructuralFormula>
          <StoichiometricFormula>CO</StoichiometricFormula>
          <ChemicalName><Value>Carbon Monoxide</Value></ChemicalName>
          <InChIKey>UGFAIRIUMAVXCW-UHFFFAOYSA-N</InChIKey>
          <VAMDCSpeciesID>UGFAIRIUMAVXCW-UHFFFAOYSA-N</VAMDCSpeciesID>
          <PartitionFunction>
            <T units="K"><DataList>9.375 150.0 300.0</DataList></T>
            <Q><DataList>3.7267 54.6 108.8651</DataList></Q>
          </PartitionFunction>
          <Comment>Carbon monoxide, v=0,1</Comment>
        </MolecularChemicalSpecies>
        <MolecularState stateID="SCDMS-1">
          <MolecularStateCharacterisation>
            <StateEnergy energyOrigin="SCDMS-1"><Value units="1/cm">0.0</Value></StateEnergy>
            <TotalStatisticalWeight>1</TotalStatisticalWeight>
          </MolecularStateCharacterisation>
          <Case xsi:type="case:Case" caseID="dcs" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <case:QNs><case:ElecStateLabel>X</case:ElecStateLabel><case:v>0</case:v><case:J>0</case:J></case:QNs>
          </Case>
        </MolecularState>
        <MolecularState stateID="SCDMS-2">
          <MolecularStateCharacterisation>
            <StateEnergy><Value units="1/cm">3.845</Value></StateEnergy>
            <TotalStatisticalWeight>3</TotalStatisticalWeight>
          </MolecularStateCharacterisation>
          <Case caseID="dcs">
            <case:QNs><case:ElecStateLabel>X</case:ElecStateLabel><case:v>0</case:v><case:J>1</case:J></case:QNs>
          </Case>
        </MolecularState>
        <MolecularState stateID="SCDMS-3">
          <MolecularStateCharacterisation>
            <StateEnergy><Value units="1/cm">2143.27</Value></StateEnergy>
            <TotalStatisticalWeight>3</TotalStatisticalWeight>
          </MolecularStateCharacterisation>
          <Case caseID="dcs">
            <case:QNs><case:ElecStateLabel>X</case:ElecStateLabel><case:v>1</case:v><case:J>1</case:J></case:QNs>
          </Case>
        </MolecularState>
      </Molecule>
    </Molecules>
  </Species>
  <Processes>
    <Radiative>
      <RadiativeTransition id="PCDMS-1">
        <EnergyWavelength>
          <Frequency><Value units="MHz">115271.2018</Value><Accuracy>0.0005</Accuracy></Frequency>
        </EnergyWavelength>
        <UpperStateRef>SCDMS-2</UpperStateRef>
        <LowerStateRef>SCDMS-1</LowerStateRef>
        <Probability>
          <TransitionProbabilityA><Value units="1/s">7.203e-08</Value></TransitionProbabilityA>
        </Probability>
        <ProcessClass><Code>elas</Code></ProcessClass>
        <SpeciesRef>XCDMS-28</SpeciesRef>
      </RadiativeTransition>
      <RadiativeTransition id="PCDMS-2">
        <EnergyWavelength>
          <Frequency><Value units="MHz">64144010.0</Value><Accuracy><Statistical>0.3</Statistical></Accuracy></Frequency>
        </EnergyWavelength>
        <UpperStateRef>SCDMS-3</UpperStateRef>
        <LowerStateRef>SCDMS-1</LowerStateRef>
        <ProcessClass><Code>vibr</Code></ProcessClass>
      </RadiativeTransition>
    </Radiative>
  </Processes>
</XSAMSData>"#;

    /// 13C+ with two fine-structure states.
    pub const C_ION: &str = r#"<XSAMSData>
  <Species>
    <Atoms>
      <Atom>
        <ChemicalElement><NuclearCharge>6</NuclearCharge><ElementSymbol>C</ElementSymbol></ChemicalElement>
        <Isotope>
          <IsotopeParameters><MassNumber>13</MassNumber></IsotopeParameters>
          <Ion speciesID="XCDMS-500">
            <IonCharge>1</IonCharge>
            <AtomicState stateID="S500-1">
              <AtomicNumericalData>
                <StateEnergy><Value units="1/cm">0.0</Value></StateEnergy>
                <StatisticalWeight>2</StatisticalWeight>
              </AtomicNumericalData>
              <AtomicQuantumNumbers><TotalAngularMomentum>0.5</TotalAngularMomentum></AtomicQuantumNumbers>
            </AtomicState>
            <AtomicState stateID="S500-2">
              <AtomicNumericalData>
                <StateEnergy><Value units="1/cm">63.42</Value></StateEnergy>
                <StatisticalWeight>4</StatisticalWeight>
              </AtomicNumericalData>
              <AtomicQuantumNumbers><TotalAngularMomentum>1.5</TotalAngularMomentum></AtomicQuantumNumbers>
            </AtomicState>
            <InChIKey>VNWKTOKETHGBQD-OUBTZVSYSA-N</InChIKey>
          </Ion>
        </Isotope>
      </Atom>
    </Atoms>
  </Species>
  <Processes>
    <Radiative>
      <RadiativeTransition id="P500-1">
        <EnergyWavelength><Frequency><Value units="MHz">1900536.9</Value><Accuracy>0.13</Accuracy></Frequency></EnergyWavelength>
        <UpperStateRef>S500-2</UpperStateRef>
        <LowerStateRef>S500-1</LowerStateRef>
        <SpeciesRef>XCDMS-500</SpeciesRef>
      </RadiativeTransition>
    </Radiative>
  </Processes>
</XSAMSData>"#;
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_molecule_metadata_and_partition_function() {
        let result = parse_xsams_str(CO).unwrap();
        let co = &result.molecules["XCDMS-28"];
        assert_eq!(co.ordinary_structural_formula.as_deref(), Some("CO"));
        assert_eq!(co.chemical_name.as_deref(), Some("Carbon Monoxide"));
        assert_eq!(co.comment.as_deref(), Some("Carbon monoxide, v=0,1"));
        assert_eq!(co.cross_reference_id(), Some("UGFAIRIUMAVXCW-UHFFFAOYSA-N"));
        assert_eq!(co.partition_functions.len(), 1);
        let pf = &co.partition_functions[0];
        assert_eq!(pf.nsi, None);
        assert_eq!(pf.points().collect::<Vec<_>>()[2], (300.0, 108.8651));
    }

    #[test]
    fn parses_states_with_case_quantum_numbers() {
        let result = parse_xsams_str(CO).unwrap();
        assert_eq!(result.states.len(), 3);
        let s3 = result.state("SCDMS-3").unwrap();
        assert_eq!(s3.species_id.as_deref(), Some("XCDMS-28"));
        assert_eq!(s3.energy_wavenumber(), Some(2143.27));
        assert_eq!(s3.total_statistical_weight, Some(3.0));
        assert_eq!(s3.quantum_numbers.case.as_deref(), Some("dcs"));
        assert_eq!(s3.quantum_numbers.vibstate().as_deref(), Some("v=1"));
        assert_eq!(s3.quantum_numbers.elec_state_label(), Some("X"));
        assert_eq!(s3.quantum_numbers.qn_string(), "ElecStateLabel=X;v=1;J=1");
    }

    #[test]
    fn parses_transitions() {
        let result = parse_xsams_str(CO).unwrap();
        let t = &result.radiative_transitions["PCDMS-1"];
        assert_eq!(t.frequency_mhz(), Some(115271.2018));
        assert_eq!(t.frequency_accuracy, Some(0.0005));
        assert_eq!(t.einstein_a, Some(7.203e-08));
        assert_eq!(t.upper_state_ref.as_deref(), Some("SCDMS-2"));
        assert_eq!(result.species_of(t).as_deref(), Some("XCDMS-28"));

        // No species reference: owner of the upper state
        let t = &result.radiative_transitions["PCDMS-2"];
        assert_eq!(t.frequency_accuracy, Some(0.3));
        assert_eq!(t.einstein_a, None);
        assert_eq!(result.species_of(t).as_deref(), Some("XCDMS-28"));
    }

    #[test]
    fn parses_atomic_ions() {
        let result = parse_xsams_str(C_ION).unwrap();
        let ion = &result.atoms["XCDMS-500"];
        assert_eq!(ion.element_symbol, "C");
        assert_eq!(ion.nuclear_charge, Some(6));
        assert_eq!(ion.mass_number.as_deref(), Some("13"));
        assert_eq!(ion.ion_charge, Some(1));
        assert_eq!(ion.cross_reference_id(), Some("VNWKTOKETHGBQD-OUBTZVSYSA-N"));

        let s = result.state("S500-2").unwrap();
        assert_eq!(s.species_id.as_deref(), Some("XCDMS-500"));
        assert_eq!(s.total_statistical_weight, Some(4.0));
        assert_eq!(s.quantum_numbers.get("TotalAngularMomentum"), Some("1.5"));
        assert_eq!(result.radiative_transitions.len(), 1);
    }

    #[test]
    fn empty_document_has_no_species() {
        let result = parse_xsams_str("<XSAMSData/>").unwrap();
        assert!(result.has_no_species());
    }

    #[test]
    fn rejects_non_xsams() {
        assert!(parse_xsams_str("<html><body>error</body></html>").is_err());
    }
}
