//! Meeting time-slot generation and availability.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::validate::ValidationError;

/// Slots open no earlier than this hour (inclusive).
const OPEN_HOUR: u32 = 9;
/// The last slot starts exactly at this hour.
const CLOSE_HOUR: u32 = 18;
/// A same-day slot must start more than this many minutes from now.
const MIN_LEAD_MINUTES: i64 = 30;

/// One selectable meeting slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    /// Canonical `HH:MM` value stored on the lead.
    pub value: String,
    /// Human-readable label, e.g. `9:30 AM`.
    pub label: String,
}

/// Generates the selectable slots: every 30 minutes from 09:00 to 18:00
/// inclusive (19 slots, the last being `18:00`).
pub fn generate_time_slots() -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    for hour in OPEN_HOUR..=CLOSE_HOUR {
        for minute in [0u32, 30] {
            if hour == CLOSE_HOUR && minute > 0 {
                break;
            }
            let value = format!("{:02}:{:02}", hour, minute);
            let label = NaiveTime::from_hms_opt(hour, minute, 0)
                .map(|t| t.format("%-I:%M %p").to_string())
                .unwrap_or_else(|| value.clone());
            slots.push(TimeSlot { value, label });
        }
    }
    slots
}

/// Whether a slot can no longer be picked.
///
/// A slot is disabled only on the current date, when its start time is at or
/// before `now` plus the minimum lead time. Slots on future dates are never
/// disabled.
pub fn is_time_slot_disabled(slot_value: &str, date: NaiveDate, now: NaiveDateTime) -> bool {
    if date != now.date() {
        return false;
    }
    let Ok(start) = NaiveTime::parse_from_str(slot_value, "%H:%M") else {
        return true;
    };
    date.and_time(start) <= now + Duration::minutes(MIN_LEAD_MINUTES)
}

/// Validates the best-time selection: both a date (not in the past) and a
/// still-available time slot are required.
pub fn validate_best_time(
    date: Option<NaiveDate>,
    slot_value: Option<&str>,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    let (Some(date), Some(slot_value)) = (date, slot_value) else {
        return Err(ValidationError::MissingDateOrTime);
    };
    if date < now.date() {
        return Err(ValidationError::DateInPast);
    }
    if is_time_slot_disabled(slot_value, date, now) {
        return Err(ValidationError::SlotUnavailable);
    }
    Ok(())
}

/// Renders the stored best-time string: `YYYY-MM-DD HH:MM (Timezone)`.
pub fn format_best_time(date: NaiveDate, slot_value: &str, timezone: &str) -> String {
    format!("{} {} ({})", date.format("%Y-%m-%d"), slot_value, timezone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn test_generates_nineteen_slots_ending_at_close() {
        let slots = generate_time_slots();
        assert_eq!(slots.len(), 19);
        assert_eq!(slots.first().unwrap().value, "09:00");
        assert_eq!(slots.last().unwrap().value, "18:00");
        assert!(slots.iter().all(|s| s.value.as_str() <= "18:00"));
    }

    #[test]
    fn test_slot_labels_are_twelve_hour() {
        let slots = generate_time_slots();
        assert_eq!(slots[0].label, "9:00 AM");
        assert_eq!(slots[1].label, "9:30 AM");
        assert_eq!(slots.last().unwrap().label, "6:00 PM");
    }

    #[test]
    fn test_same_day_slot_within_lead_time_is_disabled() {
        let today = date(2026, 8, 31);
        let now = at(today, 9, 45);
        // 10:00 starts 15 minutes out: disabled
        assert!(is_time_slot_disabled("10:00", today, now));
        // 10:15 == now + 30min boundary: still disabled ("at or before")
        assert!(is_time_slot_disabled("10:15", today, at(today, 9, 45)));
        // 10:30 starts 45 minutes out: available
        assert!(!is_time_slot_disabled("10:30", today, now));
    }

    #[test]
    fn test_future_date_slots_are_never_disabled() {
        let today = date(2026, 8, 31);
        let now = at(today, 17, 55);
        assert!(!is_time_slot_disabled("09:00", date(2026, 9, 1), now));
    }

    #[test]
    fn test_validate_requires_both_date_and_slot() {
        let today = date(2026, 8, 31);
        let now = at(today, 8, 0);
        assert_eq!(
            validate_best_time(None, Some("10:00"), now),
            Err(ValidationError::MissingDateOrTime)
        );
        assert_eq!(
            validate_best_time(Some(today), None, now),
            Err(ValidationError::MissingDateOrTime)
        );
        assert!(validate_best_time(Some(today), Some("10:00"), now).is_ok());
    }

    #[test]
    fn test_validate_rejects_past_date() {
        let now = at(date(2026, 8, 31), 8, 0);
        assert_eq!(
            validate_best_time(Some(date(2026, 8, 30)), Some("10:00"), now),
            Err(ValidationError::DateInPast)
        );
    }

    #[test]
    fn test_validate_rejects_stale_slot_today() {
        let today = date(2026, 8, 31);
        let now = at(today, 11, 0);
        assert_eq!(
            validate_best_time(Some(today), Some("09:00"), now),
            Err(ValidationError::SlotUnavailable)
        );
    }

    #[test]
    fn test_format_best_time() {
        assert_eq!(
            format_best_time(date(2026, 9, 1), "10:00", "UTC"),
            "2026-09-01 10:00 (UTC)"
        );
    }
}
