//! Datum conversions between WGS84 and the vendor-native systems.
//!
//! Mapping vendors operating in mainland China serve coordinates in the
//! GCJ-02 datum (an obfuscated offset of WGS84) or BD-09 (a further offset
//! on top of GCJ-02). The forward transform is the published series
//! expansion around the Krasovsky 1940 ellipsoid; the inverse is solved
//! iteratively against the forward transform. Coordinates outside the
//! mainland bounding box pass through unchanged, mirroring vendor
//! behaviour.

use std::f64::consts::PI;

use geo::Coord;

const KRASOVSKY_A: f64 = 6_378_245.0;
const KRASOVSKY_EE: f64 = 0.006_693_421_622_965_943;
const X_PI: f64 = PI * 3000.0 / 180.0;

/// Inverse iterations; the fixed point converges well before this.
const MAX_INVERSE_ITERATIONS: usize = 10;
const INVERSE_TOLERANCE: f64 = 1e-9;

/// Whether a WGS84 coordinate lies outside the region the offset applies to.
#[must_use]
pub fn out_of_china(at: Coord<f64>) -> bool {
    !(72.004..=137.8347).contains(&at.x) || !(0.8293..=55.8271).contains(&at.y)
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

fn offset(at: Coord<f64>) -> Coord<f64> {
    let d_lat = transform_lat(at.x - 105.0, at.y - 35.0);
    let d_lon = transform_lon(at.x - 105.0, at.y - 35.0);
    let rad_lat = at.y.to_radians();
    let magic = 1.0 - KRASOVSKY_EE * rad_lat.sin() * rad_lat.sin();
    let sqrt_magic = magic.sqrt();
    Coord {
        x: (d_lon * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI),
        y: (d_lat * 180.0) / ((KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic) * PI),
    }
}

/// WGS84 to GCJ-02.
#[must_use]
pub fn wgs84_to_gcj02(at: Coord<f64>) -> Coord<f64> {
    if out_of_china(at) {
        return at;
    }
    let d = offset(at);
    Coord {
        x: at.x + d.x,
        y: at.y + d.y,
    }
}

/// GCJ-02 to WGS84, by iterating the forward transform to a fixed point.
#[must_use]
pub fn gcj02_to_wgs84(at: Coord<f64>) -> Coord<f64> {
    if out_of_china(at) {
        return at;
    }
    let mut guess = at;
    for _ in 0..MAX_INVERSE_ITERATIONS {
        let forward = wgs84_to_gcj02(guess);
        let error = Coord {
            x: forward.x - at.x,
            y: forward.y - at.y,
        };
        guess = Coord {
            x: guess.x - error.x,
            y: guess.y - error.y,
        };
        if error.x.abs() < INVERSE_TOLERANCE && error.y.abs() < INVERSE_TOLERANCE {
            break;
        }
    }
    guess
}

/// GCJ-02 to BD-09.
#[must_use]
pub fn gcj02_to_bd09(at: Coord<f64>) -> Coord<f64> {
    let z = (at.x * at.x + at.y * at.y).sqrt() + 0.00002 * (at.y * X_PI).sin();
    let theta = at.y.atan2(at.x) + 0.000003 * (at.x * X_PI).cos();
    Coord {
        x: z * theta.cos() + 0.0065,
        y: z * theta.sin() + 0.006,
    }
}

/// BD-09 to GCJ-02.
#[must_use]
pub fn bd09_to_gcj02(at: Coord<f64>) -> Coord<f64> {
    let x = at.x - 0.0065;
    let y = at.y - 0.006;
    let z = (x * x + y * y).sqrt() - 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000003 * (x * X_PI).cos();
    Coord {
        x: z * theta.cos(),
        y: z * theta.sin(),
    }
}

/// WGS84 to BD-09.
#[must_use]
pub fn wgs84_to_bd09(at: Coord<f64>) -> Coord<f64> {
    gcj02_to_bd09(wgs84_to_gcj02(at))
}

/// BD-09 to WGS84.
#[must_use]
pub fn bd09_to_wgs84(at: Coord<f64>) -> Coord<f64> {
    gcj02_to_wgs84(bd09_to_gcj02(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BEIJING: Coord<f64> = Coord {
        x: 116.397_428,
        y: 39.909_23,
    };
    const SHANGHAI: Coord<f64> = Coord {
        x: 121.473_7,
        y: 31.230_4,
    };
    const PARIS: Coord<f64> = Coord { x: 2.3522, y: 48.8566 };

    fn close(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
        (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
    }

    #[rstest]
    fn gcj02_shifts_mainland_coordinates() {
        let shifted = wgs84_to_gcj02(BEIJING);
        let dx = shifted.x - BEIJING.x;
        let dy = shifted.y - BEIJING.y;
        // The obfuscation moves points by a few hundred metres.
        assert!(dx.abs() > 1e-3 && dx.abs() < 1e-2, "dx = {dx}");
        assert!(dy.abs() > 1e-3 && dy.abs() < 1e-2, "dy = {dy}");
    }

    #[rstest]
    #[case(BEIJING)]
    #[case(SHANGHAI)]
    fn gcj02_round_trips(#[case] at: Coord<f64>) {
        let there = wgs84_to_gcj02(at);
        let back = gcj02_to_wgs84(there);
        assert!(close(back, at, 1e-7), "round trip drifted: {back:?} vs {at:?}");
    }

    #[rstest]
    #[case(BEIJING)]
    #[case(SHANGHAI)]
    fn bd09_round_trips(#[case] at: Coord<f64>) {
        let there = wgs84_to_bd09(at);
        let back = bd09_to_wgs84(there);
        assert!(close(back, at, 1e-6), "round trip drifted: {back:?} vs {at:?}");
    }

    #[rstest]
    fn bd09_adds_its_own_offset() {
        let gcj = wgs84_to_gcj02(BEIJING);
        let bd = gcj02_to_bd09(gcj);
        assert!((bd.x - gcj.x).abs() > 1e-3);
        assert!((bd.y - gcj.y).abs() > 1e-3);
    }

    #[rstest]
    fn coordinates_outside_china_pass_through() {
        assert!(out_of_china(PARIS));
        assert_eq!(wgs84_to_gcj02(PARIS), PARIS);
        assert_eq!(gcj02_to_wgs84(PARIS), PARIS);
    }

    #[rstest]
    fn mainland_coordinates_are_in_scope() {
        assert!(!out_of_china(BEIJING));
        assert!(!out_of_china(SHANGHAI));
    }
}
