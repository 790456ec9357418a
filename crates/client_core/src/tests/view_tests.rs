use super::*;
use shared::protocol::StrengthTrend;

fn bench() -> Selection {
    Selection::new(ExerciseKind::Strength, "Bench Press")
}

fn empty_trend() -> RegionPayload {
    RegionPayload::Trend(TrendSeries::Strength(StrengthTrend::default()))
}

#[test]
fn new_view_starts_idle_for_requested_regions() {
    let view = ViewModel::new(&[Region::Trend, Region::Sessions]);
    let regions: Vec<_> = view.regions().collect();
    assert_eq!(
        regions,
        vec![
            (Region::Trend, &RegionState::Idle),
            (Region::Sessions, &RegionState::Idle)
        ]
    );
    assert!(view.region(Region::Goals).is_none());
    assert_eq!(view.kind(), ExerciseKind::Strength);
}

#[test]
fn begin_cycle_marks_every_region_loading_and_clears_notice() {
    let mut view = ViewModel::new(&Region::ALL);
    view.set_notice(PageNotice::Failure("boom".into()));

    view.begin_cycle(RequestToken(3), bench());

    assert!(view.notice().is_none());
    assert_eq!(view.selection(), Some(&bench()));
    for (_, state) in view.regions() {
        assert_eq!(state, &RegionState::Loading { token: RequestToken(3) });
    }
}

#[test]
fn apply_settles_only_the_matching_loading_region() {
    let mut view = ViewModel::new(&Region::ALL);
    view.begin_cycle(RequestToken(1), bench());

    assert!(view.apply(RequestToken(1), Region::Trend, Ok(empty_trend())));
    assert!(view.apply(
        RequestToken(1),
        Region::Sessions,
        Err("Error loading sessions.".into())
    ));

    assert!(matches!(
        view.region(Region::Trend),
        Some(RegionState::Rendered { token: RequestToken(1), .. })
    ));
    assert!(view.region(Region::Sessions).is_some_and(RegionState::is_errored));
    assert!(view
        .region(Region::PersonalRecords)
        .is_some_and(RegionState::is_loading));
}

#[test]
fn apply_ignores_other_tokens_and_settled_regions() {
    let mut view = ViewModel::new(&Region::ALL);
    view.begin_cycle(RequestToken(1), bench());
    view.begin_cycle(RequestToken(2), bench());

    assert!(!view.apply(RequestToken(1), Region::Trend, Ok(empty_trend())));
    assert_eq!(
        view.region(Region::Trend),
        Some(&RegionState::Loading { token: RequestToken(2) })
    );

    assert!(view.apply(RequestToken(2), Region::Trend, Ok(empty_trend())));
    assert!(!view.apply(RequestToken(2), Region::Trend, Err("late".into())));
    assert!(view.region(Region::Trend).and_then(RegionState::payload).is_some());
}

#[test]
fn apply_to_unknown_region_is_rejected() {
    let mut view = ViewModel::new(&[Region::Trend]);
    view.begin_cycle(RequestToken(1), bench());
    assert!(!view.apply(RequestToken(1), Region::Goals, Err("nope".into())));
}

#[test]
fn reject_sets_validation_notice_without_touching_regions() {
    let mut view = ViewModel::new(&Region::ALL);
    view.begin_cycle(RequestToken(4), bench());
    let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");
    let end = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");

    view.reject(&SelectionError::InvertedRange { start, end });

    assert_eq!(
        view.notice(),
        Some(&PageNotice::Validation(
            "start date 2024-03-01 is after end date 2024-01-01".into()
        ))
    );
    assert!(view
        .regions()
        .all(|(_, state)| state.token() == Some(RequestToken(4))));
}
