//! Counters shared by the tasks of one profile.
//!
//! Each profile owns one [`ProfileServices`]; tasks reach it through their
//! execution context and never hold counters of their own.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

const MAX_ESTIMATE_DAYS: i64 = 7;

/// Slowly replenishing stamina pool.
#[derive(Debug)]
pub struct StaminaService {
    current: AtomicI64,
    regen_per_point: Duration,
}

impl StaminaService {
    pub fn new(initial: i64, regen_per_point: Duration) -> Self {
        Self {
            current: AtomicI64::new(initial),
            regen_per_point,
        }
    }

    pub fn get(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Overwrite with an observed value (e.g. read from the screen).
    pub fn set(&self, value: i64) {
        self.current.store(value.max(0), Ordering::SeqCst);
    }

    pub fn add(&self, amount: i64) -> i64 {
        self.current.fetch_add(amount, Ordering::SeqCst) + amount
    }

    /// Deduct `amount` only if enough is available.
    pub fn try_consume(&self, amount: i64) -> bool {
        self.current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                (cur >= amount).then_some(cur - amount)
            })
            .is_ok()
    }

    /// Earliest time at which `needed` points should be available, at most
    /// a week out.
    pub fn estimate_ready(&self, needed: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        let cap = Duration::days(MAX_ESTIMATE_DAYS);
        let missing = needed.saturating_sub(self.get()).max(0);
        let wait = i32::try_from(missing)
            .ok()
            .and_then(|missing| self.regen_per_point.checked_mul(missing))
            .map_or(cap, |wait| wait.min(cap));
        now.checked_add_signed(wait).unwrap_or(now)
    }
}

/// Fixed number of action queues (marches), each busy until a return time.
#[derive(Debug)]
pub struct MarchService {
    capacity: usize,
    busy_until: Mutex<Vec<DateTime<Utc>>>,
}

impl MarchService {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            busy_until: Mutex::new(Vec::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self, now: DateTime<Utc>) -> usize {
        let mut busy = self.busy_until.lock();
        busy.retain(|t| *t > now);
        self.capacity.saturating_sub(busy.len())
    }

    /// Claim a free march until `until`. Returns false when none is free.
    pub fn occupy(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        let mut busy = self.busy_until.lock();
        busy.retain(|t| *t > now);
        if busy.len() >= self.capacity {
            return false;
        }
        busy.push(until);
        true
    }

    /// `None` when a march is free right now.
    pub fn next_free_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut busy = self.busy_until.lock();
        busy.retain(|t| *t > now);
        if busy.len() < self.capacity {
            return None;
        }
        busy.iter().min().copied()
    }
}

/// Points towards the daily objectives.
#[derive(Debug, Default)]
pub struct DailyProgress {
    points: AtomicU32,
}

impl DailyProgress {
    pub fn get(&self) -> u32 {
        self.points.load(Ordering::SeqCst)
    }

    pub fn add(&self, points: u32) -> u32 {
        self.points.fetch_add(points, Ordering::SeqCst) + points
    }

    pub fn reset(&self) {
        self.points.store(0, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct ProfileServices {
    pub stamina: StaminaService,
    pub marches: MarchService,
    pub daily_progress: DailyProgress,
}

impl ProfileServices {
    pub fn new(march_capacity: usize, stamina_regen: Duration) -> Self {
        Self {
            stamina: StaminaService::new(0, stamina_regen),
            marches: MarchService::new(march_capacity),
            daily_progress: DailyProgress::default(),
        }
    }
}
