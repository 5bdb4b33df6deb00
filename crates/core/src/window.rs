// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily time-window evaluation
//!
//! Windows are clock-of-day ranges evaluated in minutes since midnight,
//! inclusive at both ends. A window whose start is later than its end
//! matches nothing: overnight wraparound is deliberately unsupported (the
//! registry warns when such a window is loaded).

use crate::program::{Program, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing `"HH:MM"` clock times
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("expected HH:MM, got: {0}")]
    Malformed(String),
    #[error("hour out of range: {0}")]
    HourOutOfRange(u8),
    #[error("minute out of range: {0}")]
    MinuteOutOfRange(u8),
}

/// A 24-hour clock-of-day value (hour and minute)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ParseTimeError> {
        if hour > 23 {
            return Err(ParseTimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(ParseTimeError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn minutes_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseTimeError::Malformed(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;
        let hour: u8 = hour.parse().map_err(|_| malformed())?;
        let minute: u8 = minute.parse().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A daily recurring window, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from `"HH:MM"` start and end strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ParseTimeError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// `start <= now <= end` in minutes-of-day; boundary instants are active
    pub fn contains(&self, now_minutes: u16) -> bool {
        self.start.minutes_of_day() <= now_minutes && now_minutes <= self.end.minutes_of_day()
    }

    /// A wraparound window matches no instant at all
    pub fn is_wraparound(&self) -> bool {
        self.start.minutes_of_day() > self.end.minutes_of_day()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Select the program to decrement this tick, or `None` when idle.
///
/// Filters to the resource type, remaining quantity, and window
/// containment, then takes the first match in registry order. There is no
/// priority field; load order is the tie-break.
pub fn select_active_program(
    programs: &[Program],
    resource: ResourceType,
    now_minutes: u16,
) -> Option<&Program> {
    programs
        .iter()
        .filter(|p| p.resource == resource)
        .filter(|p| p.is_runnable())
        .find(|p| p.is_within_window(now_minutes))
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
