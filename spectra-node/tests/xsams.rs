use spectra_node::*;

const ORTHO_PARA: &str = r#"<?xml version="1.0"?>
<XSAMSData xmlns="http://vamdc.org/xml/xsams/1.0">
  <Species>
    <Molecules>
      <Molecule speciesID="XCDMS-100">
        <MolecularChemicalSpecies>
          <OrdinaryStructuralFormula><Value>H2CO</Value></OrdinaryStructuralFormula>
          <StoichiometricFormula>CH2O</StoichiometricFormula>
          <VAMDCSpeciesID>WSFSSNUMVMOOMR-UHFFFAOYSA-N</VAMDCSpeciesID>
          <PartitionFunction>
            <T units="K"><DataList>150.0 300.0</DataList></T>
            <Q><DataList>1000.5 2900.25</DataList></Q>
            <NuclearSpinIsomer><Name>ortho</Name></NuclearSpinIsomer>
          </PartitionFunction>
          <PartitionFunction>
            <T units="K"><DataList>150.0 300.0</DataList></T>
            <Q><DataList>330.1 960.7</DataList></Q>
            <NuclearSpinIsomer><Name>para</Name></NuclearSpinIsomer>
          </PartitionFunction>
        </MolecularChemicalSpecies>
        <MolecularState stateID="S1">
          <MolecularStateCharacterisation>
            <StateEnergy><Value units="1/cm">10.0</Value></StateEnergy>
            <TotalStatisticalWeight>9</TotalStatisticalWeight>
            <NuclearSpinIsomer lowestEnergyStateRef="S1"><Name>ortho</Name></NuclearSpinIsomer>
          </MolecularStateCharacterisation>
          <Case caseID="asymos"><QNs><v>0</v><J>1</J><Ka>1</Ka><Kc>1</Kc></QNs></Case>
        </MolecularState>
        <MolecularState stateID="S2">
          <MolecularStateCharacterisation>
            <StateEnergy><Value units="1/cm">15.0</Value></StateEnergy>
            <TotalStatisticalWeight>15</TotalStatisticalWeight>
            <NuclearSpinIsomer lowestEnergyStateRef="S1"><Name>ortho</Name></NuclearSpinIsomer>
          </MolecularStateCharacterisation>
          <Case caseID="asymos"><QNs><v>0</v><J>2</J><Ka>1</Ka><Kc>2</Kc></QNs></Case>
        </MolecularState>
      </Molecule>
    </Molecules>
  </Species>
  <Processes>
    <Radiative>
      <RadiativeTransition id="P1">
        <EnergyWavelength><Frequency><Value units="MHz">140839.502</Value><Accuracy>0.002</Accuracy></Frequency></EnergyWavelength>
        <UpperStateRef>S2</UpperStateRef>
        <LowerStateRef>S1</LowerStateRef>
        <ProcessClass><Code>rota</Code><Code>hyp1</Code></ProcessClass>
      </RadiativeTransition>
    </Radiative>
  </Processes>
</XSAMSData>"#;

#[test]
fn partition_functions_per_isomer() {
    let result = parse_xsams_str(ORTHO_PARA).unwrap();
    let h2co = &result.molecules["XCDMS-100"];
    let isomers: Vec<_> = h2co
        .partition_functions
        .iter()
        .map(|pf| pf.nsi.as_deref())
        .collect();
    assert_eq!(isomers, vec![Some("ortho"), Some("para")]);
    assert_eq!(h2co.partition_functions[1].values, vec![330.1, 960.7]);
    assert_eq!(h2co.display_formula(), "H2CO");
}

#[test]
fn states_carry_isomer_and_reference() {
    let result = parse_xsams_str(ORTHO_PARA).unwrap();
    let upper = result.state("S2").unwrap();
    assert_eq!(upper.nsi(), Some("ortho"));
    assert_eq!(upper.nsi_lowest_energy_ref.as_deref(), Some("S1"));
    assert_eq!(upper.quantum_numbers.case.as_deref(), Some("asymos"));
    assert_eq!(upper.quantum_numbers.vibstate().as_deref(), Some("v=0"));
    assert_eq!(result.states_of("XCDMS-100").count(), 2);
}

#[test]
fn transition_hyperfine_tag() {
    let result = parse_xsams_str(ORTHO_PARA).unwrap();
    let t = &result.radiative_transitions["P1"];
    assert_eq!(t.hyperfine_tag(), Some("hyp1"));
    assert_eq!(t.accuracy_mhz(), Some(0.002));
}

#[test]
fn species_catalogue_lists_molecules_and_atoms() {
    let result = parse_xsams_str(ORTHO_PARA).unwrap();
    let catalogue = result.species_catalogue();
    assert_eq!(catalogue.len(), 1);
    assert_eq!(catalogue.species_ids().collect::<Vec<_>>(), vec!["XCDMS-100"]);
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(parse_xsams_str("<XSAMSData><Species></XSAMSData>").is_err());
}
