/// Julian day (UT) for a proleptic Gregorian calendar date.
///
/// `hour` is the fractional hour of the day, e.g. `hours + minutes / 60`.
pub fn julian_day(year: i32, month: u32, day: u32, hour: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (f64::from(year) - 1.0, f64::from(month) + 12.0)
    } else {
        (f64::from(year), f64::from(month))
    };

    let century = (y / 100.0).floor();
    let gregorian_correction = 2.0 - century + (century / 4.0).floor();

    (365.25 * (y + 4716.0)).floor()
        + (30.6001 * (m + 1.0)).floor()
        + f64::from(day)
        + gregorian_correction
        - 1524.5
        + hour / 24.0
}
