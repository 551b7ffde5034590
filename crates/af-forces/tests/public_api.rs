//! Exercises the crate-root exports the downstream pipeline consumes.

use af_forces::{parse_str, wind_axis, ForceAverage, WindForces};

#[test]
fn summary_types_are_reachable_from_the_root() {
    let log = "\
# Time forces(pressure viscous porous)
1 ((1 0 2) (0 0 0) (0 0 0))
2 ((3 0 6) (0 0 0) (0 0 0))
";
    let series = parse_str(log);
    let average: ForceAverage = series.tail_average(2).unwrap();
    assert!((average.drag - 2.0).abs() < 1e-12);

    let wind: WindForces = wind_axis(0.0, average.drag, average.lift);
    assert!((wind.drag - 2.0).abs() < 1e-12);
    assert!((wind.lift - 4.0).abs() < 1e-12);
}
