//! # Power-ups
//!
//! Timed and instant pickups. A power-up lies on a cell until collected, then
//! becomes active until its duration runs out. Times are milliseconds on the
//! session clock.

use serde::{Deserialize, Serialize};

/// The fixed catalogue of power-up types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    PursuerFreeze,
    DoublePoints,
    ExtraLife,
    PowerMode,
    WallPass,
    PointMagnet,
}

impl PowerUpKind {
    /// Every kind the spawner may pick from.
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::PursuerFreeze,
        PowerUpKind::DoublePoints,
        PowerUpKind::ExtraLife,
        PowerUpKind::PowerMode,
        PowerUpKind::WallPass,
        PowerUpKind::PointMagnet,
    ];

    /// Active duration in milliseconds; zero means instant.
    pub fn duration_ms(self) -> u64 {
        match self {
            PowerUpKind::SpeedBoost => 10_000,
            PowerUpKind::PursuerFreeze => 5_000,
            PowerUpKind::DoublePoints => 15_000,
            PowerUpKind::ExtraLife => 0,
            PowerUpKind::PowerMode => 20_000,
            PowerUpKind::WallPass => 8_000,
            PowerUpKind::PointMagnet => 12_000,
        }
    }

    pub fn is_instant(self) -> bool {
        self.duration_ms() == 0
    }

    pub fn description(self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "Speed Boost +50%",
            PowerUpKind::PursuerFreeze => "Freeze Pursuers",
            PowerUpKind::DoublePoints => "Double Points",
            PowerUpKind::ExtraLife => "Extra Life",
            PowerUpKind::PowerMode => "Super Power Mode",
            PowerUpKind::WallPass => "Phase Through Walls",
            PowerUpKind::PointMagnet => "Point Magnet",
        }
    }
}

/// One power-up instance.
///
/// # Examples
///
/// ```
/// use mazechase::{PowerUp, PowerUpKind};
///
/// let mut freeze = PowerUp::new(PowerUpKind::PursuerFreeze, 0);
/// freeze.activate(1_000);
/// assert!(!freeze.is_expired(5_999));
/// assert!(freeze.is_expired(6_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub created_ms: u64,
    pub activated_ms: Option<u64>,
    active: bool,
    collected: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, created_ms: u64) -> Self {
        Self {
            kind,
            created_ms,
            activated_ms: None,
            active: false,
            collected: false,
        }
    }

    /// Marks the power-up collected at `now_ms`.
    ///
    /// Instant kinds are collected but never become active. Collecting twice
    /// has no effect.
    pub fn activate(&mut self, now_ms: u64) {
        if self.collected {
            return;
        }
        self.collected = true;
        self.activated_ms = Some(now_ms);
        self.active = !self.kind.is_instant();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// True once `now_ms - activated_ms >= duration`. Inactive and instant
    /// power-ups never expire.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match (self.active, self.activated_ms) {
            (true, Some(activated)) => now_ms.saturating_sub(activated) >= self.kind.duration_ms(),
            _ => false,
        }
    }

    /// Whole seconds left, rounded down.
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        match (self.active, self.activated_ms) {
            (true, Some(activated)) => {
                let elapsed = now_ms.saturating_sub(activated);
                self.kind.duration_ms().saturating_sub(elapsed) / 1000
            }
            _ => 0,
        }
    }
}

/// Read-only view of an active power-up for snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUpView {
    pub kind: PowerUpKind,
    pub remaining_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        for kind in PowerUpKind::ALL.into_iter().filter(|k| !k.is_instant()) {
            let mut power_up = PowerUp::new(kind, 0);
            power_up.activate(2_500);
            let deadline = 2_500 + kind.duration_ms();
            assert!(!power_up.is_expired(2_500));
            assert!(!power_up.is_expired(deadline - 1));
            assert!(power_up.is_expired(deadline));
            assert!(power_up.is_expired(deadline + 10_000));
        }
    }

    #[test]
    fn test_uncollected_never_expires() {
        let power_up = PowerUp::new(PowerUpKind::SpeedBoost, 0);
        assert!(!power_up.is_active());
        assert!(!power_up.is_expired(u64::MAX));
    }

    #[test]
    fn test_instant_never_active() {
        let mut life = PowerUp::new(PowerUpKind::ExtraLife, 0);
        life.activate(100);
        assert!(life.is_collected());
        assert!(!life.is_active());
        assert!(!life.is_expired(1_000_000));
        assert_eq!(life.remaining_secs(100), 0);
    }

    #[test]
    fn test_second_activation_ignored() {
        let mut boost = PowerUp::new(PowerUpKind::SpeedBoost, 0);
        boost.activate(1_000);
        boost.activate(9_000);
        assert_eq!(boost.activated_ms, Some(1_000));
    }

    #[test]
    fn test_remaining_seconds() {
        let mut magnet = PowerUp::new(PowerUpKind::PointMagnet, 0);
        magnet.activate(0);
        assert_eq!(magnet.remaining_secs(0), 12);
        assert_eq!(magnet.remaining_secs(1), 11);
        assert_eq!(magnet.remaining_secs(11_999), 0);
        assert_eq!(magnet.remaining_secs(50_000), 0);
    }
}
