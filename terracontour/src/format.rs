//! Human-readable formatting helpers.

use std::time::Duration;

const UNITS: [(u128, &str); 6] = [
    (604_800_000, "weeks"),
    (86_400_000, "days"),
    (3_600_000, "hours"),
    (60_000, "minutes"),
    (1_000, "seconds"),
    (1, "ms"),
];

/// Formats a duration as `"1 hours, 2 minutes, 3 seconds, 4 ms"`.
///
/// Units with a zero count are omitted. A zero duration formats as `"0 ms"`.
/// This is the format stored in the `duration` field of checkpoint records.
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_millis();
    let mut parts = Vec::new();

    for (unit_ms, label) in UNITS {
        let count = remaining / unit_ms;
        remaining -= count * unit_ms;
        if count > 0 {
            parts.push(format!("{} {}", count, label));
        }
    }

    if parts.is_empty() {
        "0 ms".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(format_duration(Duration::ZERO), "0 ms");
    }

    #[test]
    fn test_millis_only() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
    }

    #[test]
    fn test_zero_units_are_skipped() {
        let d = Duration::from_millis(3_600_000 + 5_000);
        assert_eq!(format_duration(d), "1 hours, 5 seconds");
    }

    #[test]
    fn test_all_units() {
        let d = Duration::from_millis(604_800_000 + 86_400_000 + 3_600_000 + 60_000 + 1_000 + 1);
        assert_eq!(
            format_duration(d),
            "1 weeks, 1 days, 1 hours, 1 minutes, 1 seconds, 1 ms"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn parse_back(s: &str) -> u128 {
            s.split(", ")
                .map(|part| {
                    let (count, label) = part.split_once(' ').unwrap();
                    let count: u128 = count.parse().unwrap();
                    let unit = UNITS.iter().find(|(_, l)| *l == label).unwrap().0;
                    count * unit
                })
                .sum()
        }

        proptest! {
            #[test]
            fn test_format_preserves_total(ms in 0u64..10_000_000_000u64) {
                let formatted = format_duration(Duration::from_millis(ms));
                prop_assert_eq!(parse_back(&formatted), ms as u128);
            }
        }
    }
}
