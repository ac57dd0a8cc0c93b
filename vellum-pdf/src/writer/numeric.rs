use std::io::Write;

use crate::writer::Sink;

/// Writes an integer as a leading space plus decimal digits.
pub fn write_integer<W: Write>(sink: &mut Sink<W>, value: i64) -> std::io::Result<usize> {
    sink.write_bytes(format!(" {value}").as_bytes())
}

/// Writes a real number as a leading space plus its fixed-point form.
pub fn write_real<W: Write>(sink: &mut Sink<W>, value: f64) -> std::io::Result<usize> {
    let mut token = String::from(" ");
    token.push_str(&format_real(value));

    sink.write_bytes(token.as_bytes())
}

/// Fixed-point rendering of a real number: `.` as the decimal separator
/// regardless of locale, at most five fractional digits, trailing zeros
/// trimmed. Integral values render without a fraction.
pub fn format_real(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e18 {
        return format!("{}", value as i64);
    }

    let mut formatted = format!("{value:.5}");

    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_formatting() {
        // Test 1: integral reals carry no fraction
        assert_eq!(format_real(0.0), "0");
        assert_eq!(format_real(-4.0), "-4");

        // Test 2: trailing zeros are trimmed
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(2.25), "2.25");

        // Test 3: precision is capped at five fractional digits
        assert_eq!(format_real(0.123456789), "0.12346");
        assert_eq!(format_real(-1.000001), "-1");

        // Test 4: no exponential notation, ever
        assert!(!format_real(1.0e19).contains('e'));
    }

    #[test]
    fn tokens_carry_a_leading_space() {
        let mut sink = Sink::new(Vec::new());
        write_integer(&mut sink, -17).unwrap();
        write_real(&mut sink, 3.14159).unwrap();

        assert_eq!(sink.into_inner(), b" -17 3.14159");
    }
}
