//! Exports intended for internal use only.
//!
//! These need to be exported for access from the CLI, but they are not
//! intended for use by external code. This module's API may change without
//! semantic versioning!

pub mod report {
    use std::fmt::Write;

    use crate::{Gcj02Point, Wgs84Point, is_outside_china, offset, to_gcj02, to_wgs84};

    type Result<T> = std::result::Result<T, std::fmt::Error>;

    /// Default point for the demo report: Tian'anmen, Beijing.
    pub const DEMO_POINT: Wgs84Point = Wgs84Point::from_degrees(116.397428, 39.90923);

    /// Decimal places used when formatting a report.
    #[derive(Clone, Copy, Debug, Default)]
    pub enum Precision {
        /// Shortest representation that round-trips.
        #[default]
        Exact,
        Places(usize),
    }

    struct Formatted<T>(T, Precision);

    impl<T: std::fmt::Display> std::fmt::Display for Formatted<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self.1 {
                Precision::Exact => write!(f, "{}", self.0),
                Precision::Places(p) => write!(f, "{:.*}", p, self.0),
            }
        }
    }

    fn outside_note(r: &mut String, outside: bool) -> std::fmt::Result {
        if outside {
            writeln!(
                r,
                "(outside the China bounding box; coordinates are unchanged)"
            )?;
        }
        Ok(())
    }

    pub fn forward_report(wgs: Wgs84Point, precision: Precision) -> Result<String> {
        let mut r = String::new();
        writeln!(&mut r, "{}", Formatted(to_gcj02(wgs), precision))?;
        outside_note(&mut r, is_outside_china(wgs.lon(), wgs.lat()))?;
        Ok(r)
    }

    pub fn inverse_report(gcj: Gcj02Point, precision: Precision) -> Result<String> {
        let mut r = String::new();
        writeln!(&mut r, "{}", Formatted(to_wgs84(gcj), precision))?;
        outside_note(&mut r, is_outside_china(gcj.lon(), gcj.lat()))?;
        Ok(r)
    }

    /// Shows a point, its GCJ-02 counterpart, the offset between them, and
    /// the WGS-84 point recovered by the inverse transform.
    pub fn demo_report(wgs: Wgs84Point, precision: Precision) -> Result<String> {
        let gcj = to_gcj02(wgs);
        let mut r = String::new();
        writeln!(&mut r, "WGS-84:            {}", Formatted(wgs, precision))?;
        writeln!(&mut r, "GCJ-02:            {}", Formatted(gcj, precision))?;
        writeln!(&mut r, "Offset:            {}", Formatted(offset(wgs), precision))?;
        writeln!(
            &mut r,
            "WGS-84 (inverse):  {}",
            Formatted(to_wgs84(gcj), precision)
        )?;
        outside_note(&mut r, is_outside_china(wgs.lon(), wgs.lat()))?;
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::report::{DEMO_POINT, Precision, demo_report, forward_report, inverse_report};
    use crate::{gcj02, wgs84};

    #[test]
    fn test_demo_report() -> Result<()> {
        let r = demo_report(DEMO_POINT, Precision::Places(6))?;
        assert_eq!(
            r,
            concat!(
                "WGS-84:            116.397428,39.909230\n",
                "GCJ-02:            116.403672,39.910634\n",
                "Offset:            0.006244,0.001404\n",
                "WGS-84 (inverse):  116.397428,39.909230\n",
            )
        );
        Ok(())
    }

    #[test]
    fn test_forward_report() -> Result<()> {
        let r = forward_report(wgs84!(116.397428, 39.90923), Precision::Places(4))?;
        assert_eq!(r, "116.4037,39.9106\n");
        Ok(())
    }

    #[test]
    fn test_inverse_report_outside() -> Result<()> {
        let r = inverse_report(gcj02!(-122.5, 37.75), Precision::Exact)?;
        assert_eq!(
            r,
            "-122.5,37.75\n(outside the China bounding box; coordinates are unchanged)\n"
        );
        Ok(())
    }
}
