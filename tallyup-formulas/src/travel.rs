use crate::{FormulaError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone};

/// Connections with less slack than this are reported as tight.
pub const TIGHT_CONNECTION_MINUTES: i64 = 30;

/// Pins a wall-clock time to a UTC offset.
pub fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&local)
        .single()
        .ok_or(FormulaError::InvalidLocalTime)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlightDuration {
    pub total_minutes: i64,
}

impl FlightDuration {
    pub fn hours(&self) -> i64 {
        self.total_minutes / 60
    }

    pub fn minutes(&self) -> i64 {
        self.total_minutes % 60
    }
}

/// Elapsed time between two offset-aware instants, compared in UTC.
pub fn flight_duration(
    departure: DateTime<FixedOffset>,
    arrival: DateTime<FixedOffset>,
) -> Result<FlightDuration> {
    let elapsed = arrival - departure;
    if elapsed <= TimeDelta::zero() {
        return Err(FormulaError::NonPositiveDuration);
    }
    Ok(FlightDuration {
        total_minutes: elapsed.num_minutes(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimezoneDifference {
    /// `to - from`; positive when the destination is ahead.
    pub offset_minutes: i32,
    pub converted: NaiveDateTime,
}

pub fn timezone_difference(
    local: NaiveDateTime,
    from: FixedOffset,
    to: FixedOffset,
) -> Result<TimezoneDifference> {
    let instant = at_offset(local, from)?;
    let offset_seconds = to.local_minus_utc() - from.local_minus_utc();
    Ok(TimezoneDifference {
        offset_minutes: offset_seconds / 60,
        converted: instant.with_timezone(&to).naive_local(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferStatus {
    Insufficient,
    Tight,
    Comfortable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferTime {
    pub layover: TimeDelta,
    /// Layover left over after the minimum connection time.
    pub buffer: TimeDelta,
    pub status: BufferStatus,
}

pub fn buffer_time(
    arrival: DateTime<FixedOffset>,
    next_departure: DateTime<FixedOffset>,
    minimum_connection: TimeDelta,
) -> Result<BufferTime> {
    if minimum_connection < TimeDelta::zero() {
        return Err(FormulaError::Negative {
            field: "minimum connection time",
        });
    }

    let layover = next_departure - arrival;
    let buffer = layover - minimum_connection;
    let status = if buffer < TimeDelta::zero() {
        BufferStatus::Insufficient
    } else if buffer < TimeDelta::minutes(TIGHT_CONNECTION_MINUTES) {
        BufferStatus::Tight
    } else {
        BufferStatus::Comfortable
    };

    Ok(BufferTime {
        layover,
        buffer,
        status,
    })
}
