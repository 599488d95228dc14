///! Sexagesimal formatting for equatorial coordinates.

/// Format a right ascension in degrees as `HH:MM:SS.ss` hours.
///
/// Values outside `[0, 360)` are wrapped first. Rounding carries into the
/// minute and hour fields, so 359.99999° becomes `00:00:00.00`.
pub fn format_ra(ra_deg: f64) -> String {
    const CENTISECONDS_PER_DAY: i64 = 24 * 3600 * 100;

    let hours = ra_deg.rem_euclid(360.0) / 15.0;
    let total = ((hours * 3600.0 * 100.0).round() as i64).rem_euclid(CENTISECONDS_PER_DAY);

    let h = total / 360_000;
    let m = (total / 6_000) % 60;
    let cs = total % 6_000;

    format!("{:02}:{:02}:{:02}.{:02}", h, m, cs / 100, cs % 100)
}

/// Format a declination in degrees as `DD:MM:SS.s`, with a leading `-` when
/// south of the equator.
pub fn format_dec(dec_deg: f64) -> String {
    let sign = if dec_deg < 0.0 { "-" } else { "" };
    let total = (dec_deg.abs() * 3600.0 * 10.0).round() as i64;

    let d = total / 36_000;
    let m = (total / 600) % 60;
    let ds = total % 600;

    format!("{}{:02}:{:02}:{:02}.{}", sign, d, m, ds / 10, ds % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ra() {
        assert_eq!(format_ra(0.0), "00:00:00.00");
        assert_eq!(format_ra(15.0), "01:00:00.00");
        // M57, J2000
        assert_eq!(format_ra(283.396_25), "18:53:35.10");
        assert_eq!(format_ra(-15.0), "23:00:00.00");
    }

    #[test]
    fn test_format_ra_rounding_carries() {
        assert_eq!(format_ra(359.999_999_9), "00:00:00.00");
        assert_eq!(format_ra(14.999_999_99), "01:00:00.00");
    }

    #[test]
    fn test_format_dec() {
        assert_eq!(format_dec(0.0), "00:00:00.0");
        assert_eq!(format_dec(33.029_166_67), "33:01:45.0");
        assert_eq!(format_dec(-16.5), "-16:30:00.0");
        assert_eq!(format_dec(-0.25), "-00:15:00.0");
        assert_eq!(format_dec(89.999_999_99), "90:00:00.0");
    }
}
