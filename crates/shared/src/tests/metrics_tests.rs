use super::*;

#[test]
fn epley_matches_reference_value() {
    let estimate = estimate_one_rep_max(5, 150.0, OneRepMaxFormula::Epley).expect("estimate");
    assert!((estimate - 175.0).abs() < 1e-9);
}

#[test]
fn non_positive_inputs_have_no_estimate() {
    assert_eq!(estimate_one_rep_max(0, 100.0, OneRepMaxFormula::Epley), None);
    assert_eq!(estimate_one_rep_max(5, 0.0, OneRepMaxFormula::Mayhew), None);
    assert_eq!(estimate_one_rep_max(40, 100.0, OneRepMaxFormula::Brzycki), None);
}

#[test]
fn unknown_formula_name_falls_back_to_epley() {
    assert_eq!(
        "wathan".parse::<OneRepMaxFormula>(),
        Ok(OneRepMaxFormula::Epley)
    );
    assert_eq!(
        "OConner".parse::<OneRepMaxFormula>(),
        Ok(OneRepMaxFormula::OConner)
    );
}

#[test]
fn pace_formats_as_minutes_and_seconds() {
    assert_eq!(format_pace(7.5), "7:30");
    assert_eq!(format_pace(9.25), "9:15");
    assert_eq!(pace_minutes_per_mile(2.0, 17.0), Some(8.5));
    assert_eq!(pace_minutes_per_mile(0.0, 17.0), None);
}

#[test]
fn numbers_drop_trailing_zeros() {
    assert_eq!(format_number(185.0), "185");
    assert_eq!(format_number(3.10), "3.1");
    assert_eq!(format_number(2.456), "2.46");
}
