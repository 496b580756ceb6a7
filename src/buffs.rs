//! Timed buffs granted by power-ups.
//!
//! The same [`BuffSet`] type carries a bot's own buffs and the swarm-wide
//! state the world hands to newly created bots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of timed buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Multiplies max speed
    Speed,
    /// Multiplies warrior damage
    Damage,
}

/// One running buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBuff {
    /// Ticks left before expiry
    pub remaining: u32,
    /// Number of stacked grants since the buff was last idle
    pub stacks: u32,
}

/// Buff kind -> running buff, each entry expiring on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffSet {
    entries: BTreeMap<BuffKind, ActiveBuff>,
}

impl BuffSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack and refresh the timer to `duration` ticks.
    pub fn grant(&mut self, kind: BuffKind, duration: u32) {
        if duration == 0 {
            return;
        }
        let entry = self.entries.entry(kind).or_insert(ActiveBuff {
            remaining: 0,
            stacks: 0,
        });
        entry.remaining = duration;
        entry.stacks += 1;
    }

    /// Overwrite an entry outright (used when copying swarm state to a bot)
    pub fn set(&mut self, kind: BuffKind, buff: ActiveBuff) {
        if buff.remaining > 0 && buff.stacks > 0 {
            self.entries.insert(kind, buff);
        } else {
            self.entries.remove(&kind);
        }
    }

    /// Advance every timer by one tick and drop the ones that hit zero.
    /// Returns the kinds that expired.
    pub fn tick(&mut self) -> Vec<BuffKind> {
        let mut expired = Vec::new();
        for (kind, buff) in self.entries.iter_mut() {
            buff.remaining = buff.remaining.saturating_sub(1);
            if buff.remaining == 0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.entries.remove(kind);
        }
        expired
    }

    #[inline]
    pub fn get(&self, kind: BuffKind) -> Option<&ActiveBuff> {
        self.entries.get(&kind)
    }

    #[inline]
    pub fn is_active(&self, kind: BuffKind) -> bool {
        self.entries.contains_key(&kind)
    }

    #[inline]
    pub fn remaining(&self, kind: BuffKind) -> u32 {
        self.entries.get(&kind).map_or(0, |b| b.remaining)
    }

    #[inline]
    pub fn stacks(&self, kind: BuffKind) -> u32 {
        self.entries.get(&kind).map_or(0, |b| b.stacks)
    }

    /// `per_stack` raised to the number of stacks, 1.0 when inactive
    #[inline]
    pub fn multiplier(&self, kind: BuffKind, per_stack: f32) -> f32 {
        match self.entries.get(&kind) {
            Some(buff) => per_stack.powi(buff.stacks as i32),
            None => 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuffKind, ActiveBuff)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}
