use spectra_catalog::*;
use spectra_db::*;
use spectra_node::Node;
use spectra_sync::{IdentityTable, Resolution, Resolved, SpeciesMetadata, SyncError};

fn metadata() -> SpeciesMetadata {
    SpeciesMetadata {
        species_id: "XCDMS-28".into(),
        base_name: "CO".into(),
        is_atom: false,
        vamdc_species_id: Some("UGFAIRIUMAVXCW-UHFFFAOYSA-N".into()),
        stoichiometric_formula: Some("CO".into()),
        ordinary_structural_formula: Some("CO".into()),
        chemical_name: Some("Carbon monoxide".into()),
        comment: None,
        resource_id: "ivo://vamdc/cdms/vamdc-tap_12.07".into(),
        url: spectra_sync::metadata::species_url(
            &Node::new("ivo://vamdc/cdms/vamdc-tap_12.07", "https://cdms/tap/", "CDMS"),
            "XCDMS-28",
        ),
    }
}

fn key(nsi: Option<&str>, vib: Option<&str>, elec: Option<&str>) -> SubStateKey {
    SubStateKey::new(
        "XCDMS-28",
        nsi.map(str::to_string),
        vib.map(str::to_string),
        None,
        elec.map(str::to_string),
    )
}

fn insert(conn: &Connection, key: SubStateKey, status: Status) -> i64 {
    let mut draft = metadata().draft(key, status);
    draft.chemical_name = Some("from template".into());
    insert_species(conn, &draft).unwrap()
}

fn grid(values: &[(f64, f64)]) -> PartitionFunction {
    let mut pf = PartitionFunction::new();
    for &(t, v) in values {
        pf.set_at(t, v);
    }
    pf
}

#[test]
fn exact_match_wins() {
    let conn = open_memory().unwrap();
    let id = insert(&conn, key(None, Some("v=0"), None), Status::New);
    insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=0"), None), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(resolved, Resolved::Active(id));
    assert_eq!(how, Resolution::Exact);
}

#[test]
fn placeholder_promotion_keeps_row_id() {
    let conn = open_memory().unwrap();
    let id = insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    let target = key(None, Some("v=0"), Some("X"));
    let (resolved, how) = table
        .resolve(&conn, &target, &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(resolved, Resolved::Active(id));
    assert_eq!(how, Resolution::Promoted);

    let stored = get_species(&conn, id).unwrap().unwrap();
    assert_eq!(stored.key, target);
    assert_eq!(stored.name, "CO;X,v=0");
    assert_eq!(table.promoted(), 1);
}

#[test]
fn partial_promotion_prefers_electronic_gap() {
    let conn = open_memory().unwrap();
    let lacks_both = insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);
    let lacks_elec = insert(&conn, key(None, Some("v=1"), None), Status::New);
    let lacks_vib = insert(&conn, key(None, None, Some("A")), Status::New);

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    // The placeholder has received transitions and is off limits.
    table.mark_received(lacks_both);

    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=1"), Some("A")), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(how, Resolution::Promoted);
    assert_eq!(resolved, Resolved::Active(lacks_elec));
    assert_eq!(get_species(&conn, lacks_vib).unwrap().unwrap().key, key(None, None, Some("A")));
}

#[test]
fn received_records_are_never_promoted() {
    let conn = open_memory().unwrap();
    let id = insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    table.mark_received(id);
    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=0"), None), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(how, Resolution::Created);
    assert_ne!(resolved, Resolved::Active(id));
    assert!(get_species(&conn, id).unwrap().unwrap().key.is_placeholder());
}

#[test]
fn created_record_clones_partition_function() {
    let conn = open_memory().unwrap();
    let template = insert(&conn, key(None, Some("v=0"), None), Status::UpToDate);
    let pf = grid(&[(300.0, 108.87), (9.375, 3.72)]);
    write_partition_function(&conn, template, &pf).unwrap();

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=1"), None), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(how, Resolution::Created);
    let Resolved::Active(id) = resolved else {
        panic!("expected an active record");
    };

    let created = get_species(&conn, id).unwrap().unwrap();
    assert_eq!(created.name, "CO;v=1");
    assert_eq!(created.status, Status::Updating);
    assert_eq!(created.chemical_name.as_deref(), Some("from template"));
    assert_eq!(partition_function(&conn, id).unwrap(), pf);
}

#[test]
fn other_isomer_lends_metadata_only() {
    let conn = open_memory().unwrap();
    let para = insert(&conn, key(Some("para"), None, None), Status::UpToDate);
    write_partition_function(&conn, para, &grid(&[(300.0, 50.0)])).unwrap();

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    let (resolved, _) = table
        .resolve(&conn, &key(Some("ortho"), None, None), &metadata(), Status::Updating)
        .unwrap();
    let Resolved::Active(id) = resolved else {
        panic!("expected an active record");
    };
    let created = get_species(&conn, id).unwrap().unwrap();
    assert_eq!(created.name, "CO;ortho");
    assert_eq!(created.chemical_name.as_deref(), Some("from template"));
    assert!(partition_function(&conn, id).unwrap().is_empty());
}

#[test]
fn empty_species_is_built_from_metadata() {
    let conn = open_memory().unwrap();
    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    assert!(table.is_empty());

    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=0"), None), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(how, Resolution::Created);
    let Resolved::Active(id) = resolved else {
        panic!("expected an active record");
    };
    let created = get_species(&conn, id).unwrap().unwrap();
    assert_eq!(created.chemical_name.as_deref(), Some("Carbon monoxide"));
    assert_eq!(created.resource_id.as_deref(), Some("ivo://vamdc/cdms/vamdc-tap_12.07"));
}

#[test]
fn kept_record_is_excluded() {
    let conn = open_memory().unwrap();
    let kept = insert(&conn, key(None, Some("v=0"), None), Status::Keep);
    let placeholder = insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);

    let mut table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    let (resolved, _) = table
        .resolve(&conn, &key(None, Some("v=0"), None), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(resolved, Resolved::Excluded(kept));

    // A kept record is never promoted, even when it is the only record that
    // generalises the key.
    table.mark_received(placeholder);
    let (resolved, how) = table
        .resolve(&conn, &key(None, Some("v=0"), Some("X")), &metadata(), Status::Updating)
        .unwrap();
    assert_eq!(how, Resolution::Created);
    assert_ne!(resolved, Resolved::Active(kept));
    assert_eq!(
        get_species(&conn, kept).unwrap().unwrap().key,
        key(None, Some("v=0"), None)
    );
}

#[test]
fn duplicate_keys_collapse_on_load() {
    let conn = open_memory().unwrap();
    let first = insert(&conn, key(None, Some("v=0"), None), Status::UpToDate);
    let second = insert(&conn, key(None, Some("v=0"), None), Status::UpToDate);

    let table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.get(first).is_some());
    assert!(get_species(&conn, second).unwrap().is_none());
}

#[test]
fn duplicate_prefers_kept_row() {
    let conn = open_memory().unwrap();
    let first = insert(&conn, key(None, Some("v=0"), None), Status::UpToDate);
    let kept = insert(&conn, key(None, Some("v=0"), None), Status::Keep);

    let table = IdentityTable::load(&conn, "XCDMS-28").unwrap();
    assert!(table.get(kept).is_some());
    assert!(get_species(&conn, first).unwrap().is_none());
}

#[test]
fn two_kept_duplicates_conflict() {
    let conn = open_memory().unwrap();
    let other = insert(&conn, key(None, Some("v=1"), None), Status::New);
    let other_dup = insert(&conn, key(None, Some("v=1"), None), Status::New);
    insert(&conn, key(None, Some("v=0"), None), Status::Keep);
    insert(&conn, key(None, Some("v=0"), None), Status::Keep);

    let err = IdentityTable::load(&conn, "XCDMS-28").unwrap_err();
    assert!(matches!(err, SyncError::IdentityResolutionConflict { .. }));
    // Nothing was deleted.
    assert!(get_species(&conn, other).unwrap().is_some());
    assert!(get_species(&conn, other_dup).unwrap().is_some());
}
