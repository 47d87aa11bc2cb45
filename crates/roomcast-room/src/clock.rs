//! Wall-clock source for message timestamps.

/// Produces the display time stamped on every outgoing message.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time formatted for display.
    fn timestamp(&self) -> String;
}

/// Local time in 12-hour short form, e.g. `3:45 PM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        chrono::Local::now().format("%-I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_clock_short_time_shape() {
        let stamp = LocalClock.timestamp();
        let (clock, meridiem) = stamp.split_once(' ').unwrap();
        assert!(meridiem == "AM" || meridiem == "PM", "{stamp}");

        let (hour, minute) = clock.split_once(':').unwrap();
        let hour: u32 = hour.parse().unwrap();
        assert!((1..=12).contains(&hour));
        assert_eq!(minute.len(), 2);
    }
}
