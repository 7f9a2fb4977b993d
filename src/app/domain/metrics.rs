//! Derived read-only figures. Callers pass values taken from already-scoped collections.

/// Percentage of expected participants who attended, rounded half to even.
/// Zero when nobody was expected. Saturates at `i64::MAX`.
pub fn attendance_rate(expected_participants: i64, actual_participants: i64) -> i64 {
    if expected_participants <= 0 {
        return 0;
    }
    let numerator = 100 * i128::from(actual_participants);
    let expected = i128::from(expected_participants);
    let quotient = numerator.div_euclid(expected);
    let twice_remainder = 2 * numerator.rem_euclid(expected);

    let rounded = if twice_remainder > expected || (twice_remainder == expected && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}
