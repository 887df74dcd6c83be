/// One telemetry reading: position in sensor units (g) and Euler angles in
/// degrees, in the wire order `x,z,yaw,pitch,roll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Substrings the firmware prints during startup and calibration. A line
/// containing any of these is status output, not telemetry. Case-sensitive.
const BANNER_MARKERS: &[&str] = &[
    "Inicializando",
    "listo",
    "inicializado",
    "Buscando",
    "detectado",
    "conectado",
    "MPU",
];

/// Parses one serial line into a [`Sample`].
///
/// Returns `None` for empty lines, firmware banner lines, and anything that
/// does not split on `,` into exactly five finite floats. A `None` here is a
/// normal "no data this tick" outcome, never an error, and the line is
/// discarded whole rather than partially consumed.
pub fn parse(line: &str) -> Option<Sample> {
    if line.is_empty() || BANNER_MARKERS.iter().any(|marker| line.contains(marker)) {
        return None;
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 5 {
        return None;
    }

    let mut values = [0.0f64; 5];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }

    Some(Sample {
        x: values[0],
        z: values[1],
        yaw: values[2],
        pitch: values[3],
        roll: values[4],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_data_line() {
        let sample = parse("0.5,1.2,90,0,0").unwrap();
        assert_eq!(
            sample,
            Sample {
                x: 0.5,
                z: 1.2,
                yaw: 90.0,
                pitch: 0.0,
                roll: 0.0,
            }
        );
    }

    #[test]
    fn parses_negative_and_fractional_values() {
        let sample = parse("-0.03,0.002,-179.5,12.25,3e-1").unwrap();
        assert_eq!(sample.x, -0.03);
        assert_eq!(sample.roll, 0.3);
    }

    #[test]
    fn tolerates_whitespace_around_fields() {
        let sample = parse(" 1.0, 2.0 ,3.0,4.0, 5.0 ").unwrap();
        assert_eq!(sample.x, 1.0);
        assert_eq!(sample.roll, 5.0);
    }

    #[test]
    fn rejects_banner_lines() {
        assert_eq!(parse("MPU inicializado"), None);
        assert_eq!(parse("Inicializando sensor..."), None);
        assert_eq!(parse("Sensor listo"), None);
        assert_eq!(parse("Buscando dispositivo"), None);
        assert_eq!(parse("DMP detectado"), None);
        assert_eq!(parse("Puerto conectado"), None);
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(parse(""), None);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(parse("1,2,3,4"), None);
        assert_eq!(parse("1,2,3,4,5,6"), None);
        assert_eq!(parse("1.0"), None);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(parse("1,2,three,4,5"), None);
        assert_eq!(parse("a,b,c,d,e"), None);
        assert_eq!(parse("1,2,,4,5"), None);
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(parse("1,2,NaN,4,5"), None);
        assert_eq!(parse("inf,2,3,4,5"), None);
    }

    #[test]
    fn never_panics_on_garbage() {
        for line in ["\u{0}\u{1}\u{2}", ",,,,", "1,2,3,4,5,", "🤖", "- , - , - , - , -"] {
            let _ = parse(line);
        }
    }
}
