use spectra_catalog::*;
use spectra_db::*;

fn insert(conn: &Connection, key: SubStateKey, status: Status) -> i64 {
    let mut draft = NewSpecies::placeholder(key.species_id.clone(), name_for_key("CO", &key));
    draft.key = key;
    draft.status = status;
    draft.resource_id = Some("ivo://vamdc/cdms/vamdc-tap".to_string());
    insert_species(conn, &draft).unwrap()
}

fn vib(species_id: &str, v: &str) -> SubStateKey {
    SubStateKey::new(species_id, None, Some(v.to_string()), None, None)
}

fn line(frequency: f64) -> NewTransition {
    NewTransition {
        name: "CO".to_string(),
        frequency,
        einstein_a: None,
        uncertainty: 0.05,
        energy_lower: Some(3.845),
        upper_state_degeneracy: 5,
        hfs: None,
        upper_state_quantum_numbers: None,
        lower_state_quantum_numbers: None,
    }
}

#[test]
fn find_by_key_treats_absent_dimensions_as_null() {
    let conn = open_memory().unwrap();
    let placeholder = insert(&conn, SubStateKey::placeholder("XCDMS-28", None), Status::New);
    let v0 = insert(&conn, vib("XCDMS-28", "v=0"), Status::New);

    let found = find_species_by_key(&conn, &SubStateKey::placeholder("XCDMS-28", None))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, placeholder);
    let found = find_species_by_key(&conn, &vib("XCDMS-28", "v=0")).unwrap().unwrap();
    assert_eq!(found.id, v0);
    assert!(find_species_by_key(&conn, &vib("XCDMS-28", "v=1")).unwrap().is_none());
    assert!(
        find_species_by_key(&conn, &SubStateKey::placeholder("XCDMS-28", Some("ortho".into())))
            .unwrap()
            .is_none()
    );
}

#[test]
fn find_by_key_prefers_lowest_id_among_duplicates() {
    let conn = open_memory().unwrap();
    let first = insert(&conn, vib("XCDMS-28", "v=0"), Status::New);
    insert(&conn, vib("XCDMS-28", "v=0"), Status::New);
    let found = find_species_by_key(&conn, &vib("XCDMS-28", "v=0")).unwrap().unwrap();
    assert_eq!(found.id, first);
}

#[test]
fn species_for_species_id_in_insertion_order() {
    let conn = open_memory().unwrap();
    let a = insert(&conn, vib("XCDMS-28", "v=1"), Status::New);
    insert(&conn, vib("XCDMS-29", "v=0"), Status::New);
    let b = insert(&conn, vib("XCDMS-28", "v=0"), Status::New);
    let ids: Vec<i64> = species_for_species_id(&conn, "XCDMS-28")
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn species_by_status_filters_and_orders() {
    let conn = open_memory().unwrap();
    let b = insert(&conn, vib("XCDMS-29", "v=0"), Status::UpdateAvailable);
    let a = insert(&conn, vib("XCDMS-28", "v=0"), Status::New);
    insert(&conn, vib("XCDMS-28", "v=1"), Status::Keep);
    insert(&conn, vib("XCDMS-30", "v=0"), Status::UpToDate);

    let records = species_by_status(&conn, &[Status::New, Status::UpdateAvailable]).unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn status_strings_round_trip_through_storage() {
    let conn = open_memory().unwrap();
    for status in Status::ALL {
        let id = insert(&conn, vib("XCDMS-28", status.as_str()), status);
        assert_eq!(get_species(&conn, id).unwrap().unwrap().status, status);
    }
}

#[test]
fn resource_ids_and_existence() {
    let conn = open_memory().unwrap();
    insert(&conn, vib("XCDMS-28", "v=0"), Status::New);
    insert(&conn, vib("XCDMS-29", "v=0"), Status::New);
    assert_eq!(
        distinct_resource_ids(&conn).unwrap(),
        vec!["ivo://vamdc/cdms/vamdc-tap".to_string()]
    );
    assert!(species_exists(&conn, "XCDMS-28").unwrap());
    assert!(!species_exists(&conn, "XJPL-28").unwrap());
}

#[test]
fn transitions_are_ordered_and_ranged() {
    let conn = open_memory().unwrap();
    let id = insert(&conn, vib("XCDMS-28", "v=0"), Status::UpToDate);
    for f in [345795.99, 115271.20, 230538.00] {
        insert_transition(&conn, id, &line(f)).unwrap();
    }

    let freqs: Vec<f64> = transitions_for(&conn, id)
        .unwrap()
        .iter()
        .map(|t| t.frequency)
        .collect();
    assert_eq!(freqs, vec![115271.20, 230538.00, 345795.99]);

    let lines = transitions_in_range(&conn, 200000.0, 400000.0, 10).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].species_name, "CO;v=0");
    assert_eq!(lines[0].frequency, 230538.00);

    let limited = transitions_in_range(&conn, 0.0, 1.0e7, 1).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn stats_count_records_species_and_statuses() {
    let conn = open_memory().unwrap();
    let id = insert(&conn, vib("XCDMS-28", "v=0"), Status::UpToDate);
    insert(&conn, vib("XCDMS-28", "v=1"), Status::UpToDate);
    insert(&conn, vib("XCDMS-29", "v=0"), Status::Keep);
    insert_transition(&conn, id, &line(115271.20)).unwrap();
    let mut pf = PartitionFunction::new();
    pf.set_at(300.0, 108.9);
    write_partition_function(&conn, id, &pf).unwrap();

    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.species, 2);
    assert_eq!(stats.transitions, 1);
    assert_eq!(stats.with_partition_function, 1);
    assert_eq!(
        stats.by_status,
        vec![(Status::UpToDate, 2), (Status::Keep, 1)]
    );
}
