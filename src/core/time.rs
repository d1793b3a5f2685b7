use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn primitive_after(duration: Duration) -> PrimitiveDateTime {
    primitive_now_utc() + duration
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

/// Timestamps are stored without a zone and always mean UTC.
pub(crate) fn is_past(value: PrimitiveDateTime) -> bool {
    value <= primitive_now_utc()
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, time::Month::March, 9).unwrap();
        let time = Time::from_hms(8, 5, 0).unwrap();
        assert_eq!(format_primitive(PrimitiveDateTime::new(date, time)), "2025-03-09T08:05:00Z");
    }

    #[test]
    fn to_primitive_utc_drops_offset() {
        let date = Date::from_calendar_date(2025, time::Month::March, 9).unwrap();
        let time = Time::from_hms(12, 0, 0).unwrap();
        let shifted = PrimitiveDateTime::new(date, time)
            .assume_offset(UtcOffset::from_hms(5, 0, 0).unwrap());
        assert_eq!(to_primitive_utc(shifted).time(), Time::from_hms(7, 0, 0).unwrap());
    }

    #[test]
    fn expiry_checks_follow_the_clock() {
        assert!(is_past(primitive_after(Duration::seconds(-1))));
        assert!(!is_past(primitive_after(Duration::minutes(5))));
    }
}
