//! The one canonical Jan..Dec table.
//!
//! Every component that maps month numbers to names (or back) goes through
//! here, so calendar order is defined in exactly one place.

/// Short month names in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const FULL_MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Short name for a 1-based month number. `None` outside `1..=12`.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

/// 1-based month number for a short (`Jan`) or full (`January`) name.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    MONTH_NAMES
        .iter()
        .zip(FULL_MONTH_NAMES.iter())
        .position(|(short, full)| name.eq_ignore_ascii_case(short) || name.eq_ignore_ascii_case(full))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_name_is_one_based() {
        assert_eq!(month_name(1), Some("Jan"));
        assert_eq!(month_name(12), Some("Dec"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn month_number_accepts_short_and_full_names() {
        assert_eq!(month_number("jan"), Some(1));
        assert_eq!(month_number(" September "), Some(9));
        assert_eq!(month_number("Sept"), None);
        assert_eq!(month_number("DBAvg (C)"), None);
    }
}
