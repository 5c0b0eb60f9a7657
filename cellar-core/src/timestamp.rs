use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A cell timestamp in microseconds since the Unix epoch.
///
/// The server stores timestamps at millisecond granularity; write paths
/// truncate with [`Timestamp::truncate_to_milliseconds`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Sentinel asking the server to stamp the cell at write time.
    ///
    /// Mutations carrying a server-time cell write are not idempotent and
    /// are therefore never retried.
    pub const SERVER_TIME: Timestamp = Timestamp(-1);

    /// The current wall-clock time.
    pub fn now() -> Timestamp {
        Timestamp::from_system_time(SystemTime::now())
    }

    pub fn from_system_time(t: SystemTime) -> Timestamp {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp(d.as_micros() as i64),
            Err(e) => Timestamp(-(e.duration().as_micros() as i64)),
        }
    }

    /// Converts back to a [`SystemTime`]. Meaningless for [`SERVER_TIME`].
    ///
    /// [`SERVER_TIME`]: Timestamp::SERVER_TIME
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_micros(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_micros(self.0.unsigned_abs())
        }
    }

    pub fn micros(self) -> i64 {
        self.0
    }

    /// Truncates to millisecond granularity, the only granularity the server
    /// accepts. [`SERVER_TIME`] passes through unchanged.
    ///
    /// [`SERVER_TIME`]: Timestamp::SERVER_TIME
    pub fn truncate_to_milliseconds(self) -> Timestamp {
        if self == Timestamp::SERVER_TIME {
            self
        } else {
            Timestamp(self.0 - self.0 % 1000)
        }
    }
}

impl From<i64> for Timestamp {
    fn from(micros: i64) -> Timestamp {
        Timestamp(micros)
    }
}
