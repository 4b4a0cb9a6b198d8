use super::*;
use crate::test_support::reading;

#[test]
fn defaults_without_reading() {
    let day = project_day(None, &InterventionControls::default());
    assert_eq!(day.len(), 24);
    assert_eq!(day[0].label, "0:00");
    assert_eq!(day[23].label, "23:00");

    // hour 6 sits on the zero crossing of the diurnal curve
    assert_eq!(day[6].baseline, 200);
    // 200*0.30*0.2 + 200*0.30*0.3 + 200*0.10*0.6 = 12 + 18 + 12
    assert_eq!(day[6].predicted, 158);
    // peak at noon: 200 + 20
    assert_eq!(day[12].baseline, 220);
    assert_eq!(day[0].baseline, 180);
}

#[test]
fn uses_reading_aqi_and_sources() {
    let current = reading("Delhi", 300, 150.0);
    let controls = InterventionControls::new(50.0, 100.0, 0.0);
    let day = project_day(Some(&current), &controls);
    // shares 40/25/20: 300*0.4*0.5 + 0 + 300*0.2*1.0 = 60 + 60
    assert_eq!(day[6].baseline, 300);
    assert_eq!(day[6].predicted, 180);
}

#[test]
fn full_controls_leave_baseline_untouched() {
    let controls = InterventionControls::new(100.0, 100.0, 100.0);
    for point in project_day(None, &controls) {
        assert_eq!(point.baseline, point.predicted, "hour {}", point.hour);
    }
}

#[test]
fn controls_are_clamped_and_prediction_floors_at_zero() {
    let controls = InterventionControls::new(-20.0, 250.0, f64::NAN);
    assert_eq!(controls, InterventionControls::new(0.0, 100.0, 100.0));

    let mut heavy = reading("Delhi", 100, 40.0);
    heavy.sources = SourceShares::new(100.0, 100.0, 100.0, 0.0);
    let zeroed = InterventionControls::new(0.0, 0.0, 0.0);
    assert!(project_day(Some(&heavy), &zeroed)
        .iter()
        .all(|p| p.predicted == 0));
}

#[test]
fn zero_aqi_reading_uses_default_base() {
    let quiet = reading("Delhi", 0, 0.0);
    let day = project_day(Some(&quiet), &InterventionControls::default());
    assert_eq!(day[6].baseline, 200);
}
