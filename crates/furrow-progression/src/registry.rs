//! Actor-to-profile registry with create-on-first-access semantics and
//! leaderboard queries.
//!
//! The registry is owned by the single logical thread that drives the host
//! event loop, so it needs no locking. Profiles are never removed while the
//! process runs; an actor who leaves keeps their cached entry.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use furrow_types::{ActorId, ProfileRecord};
use tracing::debug;

use crate::curve::LevelCurve;
use crate::profile::ProgressionProfile;

// ---------------------------------------------------------------------------
// LeaderboardEntry
// ---------------------------------------------------------------------------

/// One ranked row of a leaderboard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardEntry<'a> {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// The ranked actor.
    pub actor_id: ActorId,
    /// The actor's profile.
    pub profile: &'a ProgressionProfile,
    /// Level derived at query time.
    pub level: u32,
}

// ---------------------------------------------------------------------------
// ProfileRegistry
// ---------------------------------------------------------------------------

/// Mapping from actor identity to progression profile.
///
/// Holds at most one profile per identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<ActorId, ProgressionProfile>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Return the profile for `actor_id`, inserting an empty one first if
    /// the actor has never been seen.
    pub fn get_or_create(&mut self, actor_id: ActorId) -> &mut ProgressionProfile {
        match self.profiles.entry(actor_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(actor = %actor_id, "Creating progression profile");
                entry.insert(ProgressionProfile::new())
            }
        }
    }

    /// Return the profile for `actor_id` without creating one.
    pub fn get(&self, actor_id: ActorId) -> Option<&ProgressionProfile> {
        self.profiles.get(&actor_id)
    }

    /// Level of `actor_id` under `curve`; 0 for unknown actors.
    ///
    /// Never inserts a profile.
    pub fn current_level(&self, actor_id: ActorId, curve: &LevelCurve) -> u32 {
        self.get(actor_id)
            .map_or(0, |profile| profile.current_level(curve))
    }

    /// Rank every profile by level (descending), then XP (descending), and
    /// keep the first `limit` entries.
    ///
    /// Profiles that tie on both keys keep identity order.
    pub fn top_n(&self, limit: usize, curve: &LevelCurve) -> Vec<LeaderboardEntry<'_>> {
        let mut ranked: Vec<(ActorId, &ProgressionProfile, u32)> = self
            .profiles
            .iter()
            .map(|(&actor_id, profile)| (actor_id, profile, profile.current_level(curve)))
            .collect();

        ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| b.1.xp().cmp(&a.1.xp())));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (actor_id, profile, level))| LeaderboardEntry {
                rank: idx.saturating_add(1),
                actor_id,
                profile,
                level,
            })
            .collect()
    }

    /// The entry at 1-based `position` in the full ranking, if any.
    pub fn ranked_at(&self, position: usize, curve: &LevelCurve) -> Option<LeaderboardEntry<'_>> {
        let index = position.checked_sub(1)?;
        self.top_n(position, curve).into_iter().nth(index)
    }

    /// Hydrate profiles from persisted records.
    ///
    /// A record for an identity that is already present replaces it. Returns
    /// the number of records applied.
    pub fn load_all<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = ProfileRecord>,
    {
        let mut applied: usize = 0;
        for record in records {
            self.profiles.insert(
                record.actor_id,
                ProgressionProfile::from_parts(record.display_name, record.xp),
            );
            applied = applied.saturating_add(1);
        }
        applied
    }

    /// Dehydrate every profile into persistence records.
    pub fn snapshot_all(&self) -> Vec<ProfileRecord> {
        self.profiles
            .iter()
            .map(|(&actor_id, profile)| ProfileRecord {
                actor_id,
                display_name: profile.display_name().to_owned(),
                xp: profile.xp(),
            })
            .collect()
    }

    /// Number of known actors.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no actor has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over every known actor and profile in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &ProgressionProfile)> {
        self.profiles.iter().map(|(&actor_id, profile)| (actor_id, profile))
    }
}
