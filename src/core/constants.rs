// Tick and timing
pub const FIGHT_TICK_MS: u64 = 250;
pub const NO_BITE_WAIT_MIN_MS: u64 = 8_000;
pub const NO_BITE_WAIT_MAX_MS: u64 = 20_000;
pub const BITE_SPEED_JITTER: f64 = 0.30;
pub const BITE_WINDOW_MS: u64 = 1_500;
pub const BITE_WINDOW_FLOOR_MS: u64 = 500;
pub const FIGHT_TIMEOUT_MULTIPLIER: u64 = 3;

// Candidate selection
pub const BAIT_MATCH_MULTIPLIER: f64 = 1.5;
pub const NO_BITE_PROPORTION: f64 = 0.3;
pub const NO_BITE_FLOOR_WEIGHT: f64 = 1.0;

// Skill checks (difficulty scale is 0-100)
pub const SKILL_CHECK_JITTER: i32 = 10;
pub const MAX_DIFFICULTY: u32 = 100;

// Fight contest
pub const BREAK_THRESHOLD: f64 = 100.0;
pub const METER_MAX: f64 = 100.0;
pub const REEL_BASE_POWER: f64 = 6.0;
pub const PASSIVE_STAMINA_DRAIN: f64 = 1.5;
pub const BURST_CHANCE_DIVISOR: f64 = 500.0;
pub const BURST_TENSION_BASE: f64 = 12.0;
pub const BURST_AGGRESSION_SCALE: f64 = 0.1;
pub const TENSION_DECAY: f64 = 6.0;
pub const REEL_STRAIN: f64 = 3.0;
pub const SLACK_RELIEF: f64 = 10.0;
pub const SLACK_RECOVERY: f64 = 2.0;

// Time-of-day bucket boundaries (hour of day, start inclusive)
pub const DAWN_START_HOUR: u32 = 5;
pub const DAY_START_HOUR: u32 = 8;
pub const DUSK_START_HOUR: u32 = 17;
pub const NIGHT_START_HOUR: u32 = 20;

// Configuration and persistence
pub const CONFIG_PATH_ENV: &str = "ANGLER_CONFIG_PATH";
pub const WORLD_SAVE_MAGIC: u64 = 0x414E_474C_4552_0001;
