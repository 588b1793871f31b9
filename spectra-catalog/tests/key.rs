use spectra_catalog::*;

fn key(vib: Option<&str>, hfs: Option<&str>, elec: Option<&str>) -> SubStateKey {
    SubStateKey::new(
        "XCDMS-28",
        None,
        vib.map(String::from),
        hfs.map(String::from),
        elec.map(String::from),
    )
}

#[test]
fn blank_dimensions_are_absent() {
    let a = SubStateKey::new("S", Some(" ".into()), Some("".into()), None, None);
    assert_eq!(a, SubStateKey::placeholder("S", None));
    assert!(a.is_placeholder());
}

#[test]
fn placeholder_of_keeps_isomer() {
    let k = SubStateKey::new("S", Some("ortho".into()), Some("v=1".into()), None, None);
    let p = k.placeholder_of();
    assert_eq!(p.nsi.as_deref(), Some("ortho"));
    assert!(p.is_placeholder());
}

#[test]
fn promotion_rank_orders_candidates() {
    let target = key(Some("v=1"), None, Some("X"));

    assert_eq!(
        key(Some("v=1"), None, None).promotion_rank(&target),
        Some(PromotionRank::ElectronicOnly)
    );
    assert_eq!(
        key(None, None, Some("X")).promotion_rank(&target),
        Some(PromotionRank::VibrationalOnly)
    );
    assert_eq!(
        key(None, None, None).promotion_rank(&target),
        Some(PromotionRank::Both)
    );
    assert!(PromotionRank::ElectronicOnly < PromotionRank::VibrationalOnly);
    assert!(PromotionRank::VibrationalOnly < PromotionRank::Both);
}

#[test]
fn contradicting_or_equal_keys_are_not_candidates() {
    let target = key(Some("v=1"), None, Some("X"));
    // Different known vibrational state
    assert_eq!(key(Some("v=0"), None, None).promotion_rank(&target), None);
    // Different hyperfine component
    assert_eq!(key(Some("v=1"), Some("hyp1"), None).promotion_rank(&target), None);
    // More refined than the target
    assert_eq!(
        key(Some("v=1"), None, Some("X")).promotion_rank(&key(Some("v=1"), None, None)),
        None
    );
    // Identical
    assert_eq!(target.promotion_rank(&target), None);
}

#[test]
fn other_isomer_is_not_a_candidate() {
    let target = SubStateKey::new("S", Some("para".into()), Some("v=1".into()), None, None);
    let candidate = SubStateKey::placeholder("S", Some("ortho".into()));
    assert_eq!(candidate.promotion_rank(&target), None);
}
