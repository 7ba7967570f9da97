//! Prize pool distribution for contest finalization.
//!
//! The pool is the sum of votes over all approved entries. The top three
//! entries receive 50/20/10 percent of it and the finalizing admin receives
//! 20 percent. Shares of placements that nobody fills are not redistributed.

use serde::Serialize;

/// Percent of the pool paid to placements 1, 2 and 3.
pub const PLACEMENT_SHARES_PERCENT: [i64; 3] = [50, 20, 10];

/// Percent of the pool paid to the finalizing admin.
pub const ADMIN_SHARE_PERCENT: i64 = 20;

/// XP granted to placements 1, 2 and 3.
pub const PLACEMENT_XP: [i32; 3] = [200, 150, 100];

/// An approved entry competing for a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub entry_id: i32,
    pub user_id: i32,
    pub vote_count: i32,
}

/// Prize and XP for one placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Award {
    /// 1-based placement.
    pub placement: i32,
    pub entry_id: i32,
    pub user_id: i32,
    pub votes_received: i32,
    pub prize_amount: i64,
    pub xp: i32,
}

/// Full outcome of a finalization, before anything is persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub prize_pool: i64,
    pub awards: Vec<Award>,
    pub admin_share: i64,
    /// Shares of unfilled placements, kept by nobody.
    pub undistributed: i64,
}

/// `floor(amount * percent / 100)` for non-negative inputs.
pub fn share_of(amount: i64, percent: i64) -> i64 {
    amount.max(0) * percent / 100
}

/// Rank candidates and compute every payout.
///
/// Ordering is by vote count descending; ties go to the lower entry id, i.e.
/// the entry that was created first.
pub fn distribute(candidates: &[Candidate]) -> Distribution {
    let prize_pool: i64 = candidates
        .iter()
        .map(|c| i64::from(c.vote_count.max(0)))
        .sum();

    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    let awards: Vec<Award> = ranked
        .iter()
        .zip(PLACEMENT_SHARES_PERCENT.iter().zip(PLACEMENT_XP.iter()))
        .zip(1..)
        .map(|((candidate, (&percent, &xp)), placement)| Award {
            placement,
            entry_id: candidate.entry_id,
            user_id: candidate.user_id,
            votes_received: candidate.vote_count,
            prize_amount: share_of(prize_pool, percent),
            xp,
        })
        .collect();

    let undistributed = PLACEMENT_SHARES_PERCENT
        .iter()
        .skip(awards.len())
        .map(|&percent| share_of(prize_pool, percent))
        .sum();

    Distribution {
        prize_pool,
        admin_share: share_of(prize_pool, ADMIN_SHARE_PERCENT),
        awards,
        undistributed,
    }
}
