//! Remaining-lifetime projection for note cards.
//!
//! Remaining time is never positive once `now_ms >= expires_at`, which is the
//! same boundary the sweeper uses, so the display cannot outlive the note.

use std::fmt::{Display, Formatter};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    /// Note has no expiry.
    Permanent,
    /// Expiry reached; the next sweep removes the note.
    Expired,
    Remaining { hours: i64, minutes: i64, seconds: i64 },
}

impl TimeLeft {
    pub fn compute(expires_at: Option<i64>, now_ms: i64) -> Self {
        let Some(expires_at) = expires_at else {
            return Self::Permanent;
        };
        let diff = expires_at.saturating_sub(now_ms);
        if diff <= 0 {
            return Self::Expired;
        }
        let total_minutes = diff / MS_PER_MINUTE;
        Self::Remaining {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
            seconds: (diff % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Remaining { .. })
    }
}

impl Display for TimeLeft {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Permanent => write!(f, "permanent"),
            Self::Expired => write!(f, "expired"),
            Self::Remaining {
                hours,
                minutes,
                seconds,
            } => {
                if hours * 60 + minutes > 60 {
                    write!(f, "{hours}h {minutes}m")
                } else {
                    write!(f, "{}m {seconds}s", hours * 60 + minutes)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TimeLeft;

    #[test]
    fn no_expiry_is_permanent() {
        assert_eq!(TimeLeft::compute(None, 0), TimeLeft::Permanent);
        assert_eq!(TimeLeft::Permanent.to_string(), "permanent");
    }

    #[test]
    fn expiry_instant_is_already_expired() {
        assert_eq!(TimeLeft::compute(Some(1_000), 1_000), TimeLeft::Expired);
        assert!(!TimeLeft::compute(Some(1_000), 1_001).is_positive());
    }

    #[test]
    fn short_remaining_shows_minutes_and_seconds() {
        let left = TimeLeft::compute(Some(125_500), 0);
        assert_eq!(left.to_string(), "2m 5s");
    }

    #[test]
    fn exactly_one_hour_still_shows_seconds() {
        let left = TimeLeft::compute(Some(60 * 60 * 1_000), 0);
        assert_eq!(left.to_string(), "60m 0s");
    }

    #[test]
    fn long_remaining_shows_hours_and_minutes() {
        let left = TimeLeft::compute(Some((3 * 60 + 7) * 60 * 1_000 + 15_000), 0);
        assert_eq!(left.to_string(), "3h 7m");
    }
}
