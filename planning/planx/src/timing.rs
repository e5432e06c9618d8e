use derive_more::Display;

/// A point in time, relative to a reference timepoint (e.g. `start + 2`).
#[derive(Clone, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Timestamp {
    reference: TimeRef,
    delay: i64,
}

impl Timestamp {
    /// Temporal origin of the problem (nothing changes before)
    pub const ORIGIN: Timestamp = Timestamp::new(TimeRef::Origin, 0);
    /// Temporal horizon of the problem (nothing changes after)
    pub const HORIZON: Timestamp = Timestamp::new(TimeRef::Horizon, 0);

    pub const fn new(reference: TimeRef, delay: i64) -> Self {
        Self { reference, delay }
    }

    /// Timepoint `delay` time units after the start of the action.
    pub const fn after_start(delay: i64) -> Self {
        Self::new(TimeRef::Start, delay)
    }

    pub fn reference(&self) -> &TimeRef {
        &self.reference
    }

    pub fn delay(&self) -> i64 {
        self.delay
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.delay.cmp(&0) {
            std::cmp::Ordering::Less => write!(f, "{} - {}", self.reference, -self.delay),
            std::cmp::Ordering::Equal => write!(f, "{}", self.reference),
            std::cmp::Ordering::Greater => write!(f, "{} + {}", self.reference, self.delay),
        }
    }
}

#[derive(Clone, Debug, Display, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub enum TimeRef {
    #[display("origin")]
    Origin,
    #[display("horizon")]
    Horizon,
    #[display("start")]
    Start,
    #[display("end")]
    End,
}

impl From<TimeRef> for Timestamp {
    fn from(value: TimeRef) -> Self {
        Timestamp::new(value, 0)
    }
}

/// Represents a closed temporal interval, composed of a start and end timestamps.
/// An interval whose start and end are equal denotes a single timepoint.
#[derive(Clone, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct TimeInterval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeInterval {
    pub fn at(tp: impl Into<Timestamp>) -> Self {
        let tp = tp.into();
        TimeInterval::closed(tp.clone(), tp)
    }

    pub fn closed(start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        TimeInterval {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_timepoint(&self) -> bool {
        self.start == self.end
    }
}

impl From<Timestamp> for TimeInterval {
    fn from(value: Timestamp) -> Self {
        TimeInterval::at(value)
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_timepoint() {
            write!(f, "[{}]", self.start)
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}
