use std::time::Duration;

use tracing::{info, warn};

use crate::transport::Moderation;

pub const SANCTION_REASON: &str = "Tentatives d'arnaque répétées";
pub const DEFAULT_SUSPEND_SECS: u64 = 3600;
pub const DEFAULT_BAN_DELETE_DAYS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SanctionTier {
    None,
    RoleGrant,
    TimedSuspend,
    Ban,
}

impl SanctionTier {
    pub fn from_level(level: u32) -> Self {
        match level {
            0 => SanctionTier::None,
            1 => SanctionTier::RoleGrant,
            2 => SanctionTier::TimedSuspend,
            _ => SanctionTier::Ban,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SanctionTier::None => "brak",
            SanctionTier::RoleGrant => "rola scammera",
            SanctionTier::TimedSuspend => "timeout",
            SanctionTier::Ban => "ban",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SanctionTarget {
    pub guild_id: u64,
    pub user_id: u64,
    /// Rola "flagged" dla tej gildii; `None` = nieskonfigurowana.
    pub flagged_role: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Escalator {
    suspend_for: Duration,
    ban_delete_days: u8,
}

impl Default for Escalator {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPEND_SECS, DEFAULT_BAN_DELETE_DAYS)
    }
}

impl Escalator {
    pub fn new(suspend_secs: u64, ban_delete_days: u8) -> Self {
        Self {
            suspend_for: Duration::from_secs(suspend_secs),
            ban_delete_days,
        }
    }

    /// Jedna akcja na wywołanie. Błędy tylko do logów.
    pub async fn apply(&self, tier: SanctionTier, target: SanctionTarget, moderation: &dyn Moderation) {
        let SanctionTarget { guild_id, user_id, flagged_role } = target;
        match tier {
            SanctionTier::None => {}
            SanctionTier::RoleGrant => {
                let Some(role_id) = flagged_role else {
                    return;
                };
                match moderation.grant_role(guild_id, user_id, role_id, SANCTION_REASON).await {
                    Ok(()) => info!(guild_id, user_id, role_id, "scammer role granted"),
                    Err(e) => warn!(error = ?e, guild_id, user_id, "scammer role grant failed"),
                }
            }
            SanctionTier::TimedSuspend => {
                match moderation.suspend(guild_id, user_id, self.suspend_for, SANCTION_REASON).await {
                    Ok(()) => info!(guild_id, user_id, secs = self.suspend_for.as_secs(), "timeout applied"),
                    Err(e) => warn!(error = ?e, guild_id, user_id, "timeout failed"),
                }
            }
            SanctionTier::Ban => {
                match moderation.ban(guild_id, user_id, SANCTION_REASON, self.ban_delete_days).await {
                    Ok(()) => info!(guild_id, user_id, "user banned for repeated scam attempts"),
                    Err(e) => warn!(error = ?e, guild_id, user_id, "ban failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_follows_level() {
        assert_eq!(SanctionTier::from_level(0), SanctionTier::None);
        assert_eq!(SanctionTier::from_level(1), SanctionTier::RoleGrant);
        assert_eq!(SanctionTier::from_level(2), SanctionTier::TimedSuspend);
        assert_eq!(SanctionTier::from_level(3), SanctionTier::Ban);
        assert_eq!(SanctionTier::from_level(17), SanctionTier::Ban);
    }
}
