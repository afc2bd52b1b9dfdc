// Low-precision analytic ephemeris.
//
// Mean orbital elements referred to the equinox of date, solved with Kepler's
// equation and corrected by the dominant periodic terms for the Moon, Jupiter,
// Saturn and Uranus. Pluto uses its own periodic series. Typical error is a
// few arc-minutes for the inner planets and under a degree for the outer ones.
// Rahu is the true lunar node: the mean node plus its five largest periodic
// terms (Meeus, ch. 47).

use super::{Body, Ephemeris, EphemerisError};

/// Day-number origin of the element polynomials (1999-12-31 00:00 UT).
const ELEMENTS_EPOCH_JD: f64 = 2451543.5;

/// Supported window, 1800-01-01 00:00 UT up to 2101-01-01 00:00 UT. The
/// Pluto series and the linear element rates are not fitted beyond it.
pub const VALID_FROM_JD: f64 = 2378496.5;
pub const VALID_UNTIL_JD: f64 = 2488434.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitalElementsEphemeris;

impl OrbitalElementsEphemeris {
    pub fn new() -> Self {
        OrbitalElementsEphemeris
    }
}

impl Ephemeris for OrbitalElementsEphemeris {
    fn ecliptic_longitude(&self, body: Body, julian_day: f64) -> Result<f64, EphemerisError> {
        if body.is_derived() {
            return Err(EphemerisError::UnsupportedBody(body));
        }
        if !(VALID_FROM_JD..VALID_UNTIL_JD).contains(&julian_day) {
            return Err(EphemerisError::InvalidDayNumber(julian_day));
        }

        let d = julian_day - ELEMENTS_EPOCH_JD;
        let longitude = match body {
            Body::Sun => sun_elements(d).position().longitude(),
            Body::Moon => moon_longitude(d),
            Body::Rahu => true_node(d),
            Body::Pluto => geocentric_longitude(pluto_heliocentric(d), d),
            planet => {
                let elements = planet_elements(planet, d).ok_or_else(|| EphemerisError::Computation {
                    body,
                    reason: "no orbital elements".to_string(),
                })?;
                let heliocentric = perturbed(planet, elements.position(), d);
                geocentric_longitude(heliocentric, d)
            }
        };

        if longitude.is_finite() {
            Ok(rev(longitude))
        } else {
            Err(EphemerisError::Computation {
                body,
                reason: format!("non-finite longitude at day-number {}", julian_day),
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    node: f64,
    inclination: f64,
    perihelion: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    mean_anomaly: f64,
}

#[derive(Debug, Clone, Copy)]
struct Rectangular {
    x: f64,
    y: f64,
    z: f64,
}

impl Rectangular {
    fn from_spherical(longitude: f64, latitude: f64, distance: f64) -> Self {
        Rectangular {
            x: distance * cosd(longitude) * cosd(latitude),
            y: distance * sind(longitude) * cosd(latitude),
            z: distance * sind(latitude),
        }
    }

    fn longitude(&self) -> f64 {
        atan2d(self.y, self.x)
    }

    fn latitude(&self) -> f64 {
        atan2d(self.z, self.x.hypot(self.y))
    }

    fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl OrbitalElements {
    /// Position in the ecliptic frame centred on the orbit's primary.
    fn position(&self) -> Rectangular {
        let e = self.eccentricity;
        let anomaly = eccentric_anomaly(rev(self.mean_anomaly), e);

        let xv = self.semi_major_axis * (cosd(anomaly) - e);
        let yv = self.semi_major_axis * (1.0 - e * e).sqrt() * sind(anomaly);
        let true_anomaly = atan2d(yv, xv);
        let radius = xv.hypot(yv);

        let argument = true_anomaly + self.perihelion;
        let (node, inclination) = (self.node, self.inclination);

        Rectangular {
            x: radius * (cosd(node) * cosd(argument) - sind(node) * sind(argument) * cosd(inclination)),
            y: radius * (sind(node) * cosd(argument) + cosd(node) * sind(argument) * cosd(inclination)),
            z: radius * sind(argument) * sind(inclination),
        }
    }
}

fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let e_deg = e.to_degrees();
    let mut anomaly = mean_anomaly + e_deg * sind(mean_anomaly) * (1.0 + e * cosd(mean_anomaly));

    for _ in 0..20 {
        let delta = (anomaly - e_deg * sind(anomaly) - mean_anomaly) / (1.0 - e * cosd(anomaly));
        anomaly -= delta;
        if delta.abs() < 1e-7 {
            break;
        }
    }

    anomaly
}

fn sun_elements(d: f64) -> OrbitalElements {
    OrbitalElements {
        node: 0.0,
        inclination: 0.0,
        perihelion: 282.9404 + 4.70935e-5 * d,
        semi_major_axis: 1.0,
        eccentricity: 0.016709 - 1.151e-9 * d,
        mean_anomaly: 356.0470 + 0.9856002585 * d,
    }
}

fn moon_elements(d: f64) -> OrbitalElements {
    OrbitalElements {
        node: rev(125.1228 - 0.0529538083 * d),
        inclination: 5.1454,
        perihelion: 318.0634 + 0.1643573223 * d,
        semi_major_axis: 60.2666,
        eccentricity: 0.054900,
        mean_anomaly: 115.3654 + 13.0649929509 * d,
    }
}

fn planet_elements(body: Body, d: f64) -> Option<OrbitalElements> {
    let elements = match body {
        Body::Mercury => OrbitalElements {
            node: 48.3313 + 3.24587e-5 * d,
            inclination: 7.0047 + 5.00e-8 * d,
            perihelion: 29.1241 + 1.01444e-5 * d,
            semi_major_axis: 0.387098,
            eccentricity: 0.205635 + 5.59e-10 * d,
            mean_anomaly: 168.6562 + 4.0923344368 * d,
        },
        Body::Venus => OrbitalElements {
            node: 76.6799 + 2.46590e-5 * d,
            inclination: 3.3946 + 2.75e-8 * d,
            perihelion: 54.8910 + 1.38374e-5 * d,
            semi_major_axis: 0.723330,
            eccentricity: 0.006773 - 1.302e-9 * d,
            mean_anomaly: 48.0052 + 1.6021302244 * d,
        },
        Body::Mars => OrbitalElements {
            node: 49.5574 + 2.11081e-5 * d,
            inclination: 1.8497 - 1.78e-8 * d,
            perihelion: 286.5016 + 2.92961e-5 * d,
            semi_major_axis: 1.523688,
            eccentricity: 0.093405 + 2.516e-9 * d,
            mean_anomaly: 18.6021 + 0.5240207766 * d,
        },
        Body::Jupiter => OrbitalElements {
            node: 100.4542 + 2.76854e-5 * d,
            inclination: 1.3030 - 1.557e-7 * d,
            perihelion: 273.8777 + 1.64505e-5 * d,
            semi_major_axis: 5.20256,
            eccentricity: 0.048498 + 4.469e-9 * d,
            mean_anomaly: 19.8950 + 0.0830853001 * d,
        },
        Body::Saturn => OrbitalElements {
            node: 113.6634 + 2.38980e-5 * d,
            inclination: 2.4886 - 1.081e-7 * d,
            perihelion: 339.3939 + 2.97661e-5 * d,
            semi_major_axis: 9.55475,
            eccentricity: 0.055546 - 9.499e-9 * d,
            mean_anomaly: 316.9670 + 0.0334442282 * d,
        },
        Body::Uranus => OrbitalElements {
            node: 74.0005 + 1.3978e-5 * d,
            inclination: 0.7733 + 1.9e-8 * d,
            perihelion: 96.6612 + 3.0565e-5 * d,
            semi_major_axis: 19.18171 - 1.55e-8 * d,
            eccentricity: 0.047318 + 7.45e-9 * d,
            mean_anomaly: 142.5905 + 0.011725806 * d,
        },
        Body::Neptune => OrbitalElements {
            node: 131.7806 + 3.0173e-5 * d,
            inclination: 1.7700 - 2.55e-7 * d,
            perihelion: 272.8461 - 6.027e-6 * d,
            semi_major_axis: 30.05826 + 3.313e-8 * d,
            eccentricity: 0.008606 + 2.15e-9 * d,
            mean_anomaly: 260.2471 + 0.005995147 * d,
        },
        _ => return None,
    };
    Some(elements)
}

/// Fundamental lunar arguments in degrees.
struct LunarArguments {
    /// Moon's mean anomaly.
    moon_anomaly: f64,
    /// Sun's mean anomaly.
    sun_anomaly: f64,
    /// Mean elongation of the Moon from the Sun.
    elongation: f64,
    /// Argument of latitude.
    latitude_argument: f64,
    /// Mean ascending node.
    node: f64,
}

fn lunar_arguments(d: f64) -> LunarArguments {
    let moon = moon_elements(d);
    let sun = sun_elements(d);

    let mean_longitude_sun = sun.mean_anomaly + sun.perihelion;
    let mean_longitude_moon = moon.mean_anomaly + moon.perihelion + moon.node;

    LunarArguments {
        moon_anomaly: moon.mean_anomaly,
        sun_anomaly: sun.mean_anomaly,
        elongation: mean_longitude_moon - mean_longitude_sun,
        latitude_argument: mean_longitude_moon - moon.node,
        node: moon.node,
    }
}

fn true_node(d: f64) -> f64 {
    let LunarArguments { moon_anomaly: mm, sun_anomaly: ms, elongation: dd, latitude_argument: ff, node } =
        lunar_arguments(d);

    node - 1.4979 * sind(2.0 * (dd - ff))
        - 0.1500 * sind(ms)
        - 0.1226 * sind(2.0 * dd)
        + 0.1176 * sind(2.0 * ff)
        - 0.0801 * sind(2.0 * (mm - ff))
}

fn moon_longitude(d: f64) -> f64 {
    let LunarArguments { moon_anomaly: mm, sun_anomaly: ms, elongation: dd, latitude_argument: ff, .. } =
        lunar_arguments(d);

    let correction = -1.274 * sind(mm - 2.0 * dd)
        + 0.658 * sind(2.0 * dd)
        - 0.186 * sind(ms)
        - 0.059 * sind(2.0 * mm - 2.0 * dd)
        - 0.057 * sind(mm - 2.0 * dd + ms)
        + 0.053 * sind(mm + 2.0 * dd)
        + 0.046 * sind(2.0 * dd - ms)
        + 0.041 * sind(mm - ms)
        - 0.035 * sind(dd)
        - 0.031 * sind(mm + ms)
        - 0.015 * sind(2.0 * ff - 2.0 * dd)
        + 0.011 * sind(mm - 4.0 * dd);

    moon_elements(d).position().longitude() + correction
}

/// Applies the great-inequality terms between the gas giants.
fn perturbed(body: Body, heliocentric: Rectangular, d: f64) -> Rectangular {
    let mj = 19.8950 + 0.0830853001 * d;
    let ms = 316.9670 + 0.0334442282 * d;
    let mu = 142.5905 + 0.011725806 * d;

    let correction = match body {
        Body::Jupiter => {
            -0.332 * sind(2.0 * mj - 5.0 * ms - 67.6)
                - 0.056 * sind(2.0 * mj - 2.0 * ms + 21.0)
                + 0.042 * sind(3.0 * mj - 5.0 * ms + 21.0)
                - 0.036 * sind(mj - 2.0 * ms)
                + 0.022 * cosd(mj - ms)
                + 0.023 * sind(2.0 * mj - 3.0 * ms + 52.0)
                - 0.016 * sind(mj - 5.0 * ms - 69.0)
        }
        Body::Saturn => {
            0.812 * sind(2.0 * mj - 5.0 * ms - 67.6)
                - 0.229 * cosd(2.0 * mj - 4.0 * ms - 2.0)
                + 0.119 * sind(mj - 2.0 * ms - 3.0)
                + 0.046 * sind(2.0 * mj - 6.0 * ms - 69.0)
                + 0.014 * sind(mj - 3.0 * ms + 32.0)
        }
        Body::Uranus => {
            0.040 * sind(ms - 2.0 * mu + 6.0)
                + 0.035 * sind(ms - 3.0 * mu + 33.0)
                - 0.015 * sind(mj - mu + 20.0)
        }
        _ => return heliocentric,
    };

    Rectangular::from_spherical(
        heliocentric.longitude() + correction,
        heliocentric.latitude(),
        heliocentric.distance(),
    )
}

fn pluto_heliocentric(d: f64) -> Rectangular {
    let s = 50.03 + 0.033459652 * d;
    let p = 238.95 + 0.003968789 * d;

    let longitude = 238.9508 + 0.00400703 * d
        - 19.799 * sind(p) + 19.848 * cosd(p)
        + 0.897 * sind(2.0 * p) - 4.956 * cosd(2.0 * p)
        + 0.610 * sind(3.0 * p) + 1.211 * cosd(3.0 * p)
        - 0.341 * sind(4.0 * p) - 0.190 * cosd(4.0 * p)
        + 0.128 * sind(5.0 * p) - 0.034 * cosd(5.0 * p)
        - 0.038 * sind(6.0 * p) + 0.031 * cosd(6.0 * p)
        + 0.020 * sind(s - p) - 0.010 * cosd(s - p);

    let latitude = -3.9082
        - 5.453 * sind(p) - 14.975 * cosd(p)
        + 3.527 * sind(2.0 * p) + 1.673 * cosd(2.0 * p)
        - 1.051 * sind(3.0 * p) + 0.328 * cosd(3.0 * p)
        + 0.179 * sind(4.0 * p) - 0.292 * cosd(4.0 * p)
        + 0.019 * sind(5.0 * p) + 0.100 * cosd(5.0 * p)
        - 0.031 * sind(6.0 * p) - 0.026 * cosd(6.0 * p)
        + 0.011 * cosd(s - p);

    let distance = 40.72
        + 6.68 * sind(p) + 6.90 * cosd(p)
        - 1.18 * sind(2.0 * p) - 0.03 * cosd(2.0 * p)
        + 0.15 * sind(3.0 * p) - 0.14 * cosd(3.0 * p);

    Rectangular::from_spherical(longitude, latitude, distance)
}

/// Shifts a heliocentric position to the Earth by adding the Sun's
/// geocentric position.
fn geocentric_longitude(heliocentric: Rectangular, d: f64) -> f64 {
    let sun = sun_elements(d).position();
    atan2d(heliocentric.y + sun.y, heliocentric.x + sun.x)
}

fn rev(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

fn sind(angle: f64) -> f64 {
    angle.to_radians().sin()
}

fn cosd(angle: f64) -> f64 {
    angle.to_radians().cos()
}

fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}
