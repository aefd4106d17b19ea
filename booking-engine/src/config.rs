use chrono::NaiveTime;
use chrono_tz::Tz;

/// Engine configuration - booking/slot policy knobs
///
/// # 环境变量
///
/// All settings can be overridden via environment variables:
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | BOOKING_HOLD_MINUTES | 10 | Hold duration for pending reservations |
/// | BOOKING_CLEANING_BUFFER_MINUTES | 15 | Room cleaning buffer after a screening |
/// | BOOKING_OPENING_TIME | 10:00 | Operating window start (slot discovery) |
/// | BOOKING_CLOSING_TIME | 23:00 | Operating window end (slot discovery) |
/// | BOOKING_SLOT_STEP_MINUTES | 15 | Slot discovery scan granularity |
/// | BOOKING_REAPER_INTERVAL_SECS | 30 | Hold reaper sweep interval |
/// | BOOKING_TIMEZONE | UTC | Business timezone |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a pending reservation holds its seats
    pub hold_duration_minutes: i64,
    /// Added to the movie runtime when deriving a showing's end time
    pub cleaning_buffer_minutes: i64,
    /// Start of the daily operating window
    pub opening_time: NaiveTime,
    /// End of the daily operating window
    pub closing_time: NaiveTime,
    /// Step between candidate slot starts
    pub slot_step_minutes: i64,
    /// Background hold sweep interval (seconds)
    pub reaper_interval_secs: u64,
    /// 业务时区
    pub tz: Tz,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_duration_minutes: 10,
            cleaning_buffer_minutes: 15,
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            closing_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default(),
            slot_step_minutes: 15,
            reaper_interval_secs: 30,
            tz: chrono_tz::UTC,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hold_duration_minutes: env_i64("BOOKING_HOLD_MINUTES", defaults.hold_duration_minutes),
            cleaning_buffer_minutes: env_i64(
                "BOOKING_CLEANING_BUFFER_MINUTES",
                defaults.cleaning_buffer_minutes,
            ),
            opening_time: env_time("BOOKING_OPENING_TIME", defaults.opening_time),
            closing_time: env_time("BOOKING_CLOSING_TIME", defaults.closing_time),
            slot_step_minutes: env_i64("BOOKING_SLOT_STEP_MINUTES", defaults.slot_step_minutes),
            reaper_interval_secs: std::env::var("BOOKING_REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reaper_interval_secs),
            tz: std::env::var("BOOKING_TIMEZONE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tz),
        }
    }

    /// Hold duration in milliseconds
    pub fn hold_duration_millis(&self) -> i64 {
        self.hold_duration_minutes * 60_000
    }

    /// Cleaning buffer in milliseconds
    pub fn cleaning_buffer_millis(&self) -> i64 {
        self.cleaning_buffer_minutes * 60_000
    }

    /// Slot step in milliseconds
    pub fn slot_step_millis(&self) -> i64 {
        self.slot_step_minutes * 60_000
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_time(key: &str, default: NaiveTime) -> NaiveTime {
    std::env::var(key)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
        .unwrap_or(default)
}
