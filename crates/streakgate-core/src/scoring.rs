//! Engagement scoring
//!
//! Every successful login runs [`update`] over the user record:
//!
//! 1. `total_logins` goes up by one
//! 2. The streak grows on a consecutive day, resets to 1 after a gap and is
//!    left alone on a second login the same day
//! 3. Daily points: `min(50, streak * 5)`
//! 4. Badges are granted once each, in a fixed order
//! 5. `last_login_date` becomes today
//!
//! A same-day re-login still counts a login and still pays daily points.
//! Milestone badges key off exact `total_logins` values, so this is kept.
//!
//! The lookup tables (rank, milestone, streak bonus) are display-only.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::clock::{day_string, previous_day_string};
use crate::user::User;

/// Cap on points granted per login
pub const MAX_DAILY_POINTS: u64 = 50;
/// Points per streak day
pub const POINTS_PER_STREAK_DAY: u64 = 5;

pub const FIRST_LOGIN_BADGE: &str = "First Login";
pub const POINT_COLLECTOR_BADGE: &str = "Point Collector";
/// Points needed for [`POINT_COLLECTOR_BADGE`]
pub const POINT_COLLECTOR_THRESHOLD: u64 = 500;

/// Streak length -> badge, only granted on a consecutive-day login
pub const STREAK_BADGES: [(u32, &str); 4] = [
    (3, "Streaker"),
    (7, "Week Warrior"),
    (30, "Month Master"),
    (100, "Century Club"),
];

/// Total login count -> badge
pub const LOGIN_COUNT_BADGES: [(u32, &str); 3] = [
    (5, "Regular User"),
    (25, "Dedicated Member"),
    (100, "Power User"),
];

/// Rank thresholds, ascending
pub const RANKS: [(u64, &str); 6] = [
    (0, "🌱 Newcomer"),
    (500, "✨ Enrolled"),
    (1000, "🔥 Active Member"),
    (2500, "⭐ Contributor"),
    (5000, "🌟 Veteran"),
    (10000, "🏆 Legend"),
];

/// Point milestones, ascending
pub const MILESTONES: [(u64, &str); 5] = [
    (500, "Enrolled Badge"),
    (1000, "Active Member Badge"),
    (2500, "Contributor Badge"),
    (5000, "Veteran Badge"),
    (10000, "Legend Badge"),
];

/// Reward reported once every milestone is passed
pub const FINAL_REWARD: &str = "Ultimate Achievement";

/// How a login moved the streak
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Last login was yesterday
    Extended,
    /// Last login was today
    Unchanged,
    /// Gap of two or more days, or no previous login
    Reset,
}

/// What a single login earned
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginReward {
    pub streak_change: StreakChange,
    pub daily_points: u64,
    pub new_badges: Vec<&'static str>,
}

/// Next points milestone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub milestone: u64,
    pub remaining: u64,
    pub reward: &'static str,
}

/// Apply one successful login to `user`
pub fn update(user: &User, now: DateTime<Local>) -> User {
    let mut updated = user.clone();
    apply_login(&mut updated, now);
    updated
}

/// Apply one successful login in place and report what it earned
pub fn apply_login(user: &mut User, now: DateTime<Local>) -> LoginReward {
    let today = day_string(now);
    let yesterday = previous_day_string(now);
    let mut new_badges = Vec::new();

    user.total_logins = user.total_logins.saturating_add(1);

    let streak_change = if user.last_login_date == yesterday {
        user.login_streak = user.login_streak.saturating_add(1);
        StreakChange::Extended
    } else if user.last_login_date != today {
        user.login_streak = 1;
        StreakChange::Reset
    } else {
        StreakChange::Unchanged
    };

    let daily_points = daily_points(user.login_streak);
    user.points = user.points.saturating_add(daily_points);

    if streak_change == StreakChange::Extended {
        if let Some((_, badge)) = STREAK_BADGES
            .iter()
            .find(|(streak, _)| *streak == user.login_streak)
        {
            award(user, *badge, &mut new_badges);
        }
    }

    if user.total_logins == 1 {
        award(user, FIRST_LOGIN_BADGE, &mut new_badges);
    }

    if let Some((_, badge)) = LOGIN_COUNT_BADGES
        .iter()
        .find(|(count, _)| *count == user.total_logins)
    {
        award(user, *badge, &mut new_badges);
    }

    if user.points >= POINT_COLLECTOR_THRESHOLD {
        award(user, POINT_COLLECTOR_BADGE, &mut new_badges);
    }

    user.last_login_date = today;

    LoginReward {
        streak_change,
        daily_points,
        new_badges,
    }
}

fn award(user: &mut User, badge: &'static str, new_badges: &mut Vec<&'static str>) {
    if user.badges.insert(badge) {
        new_badges.push(badge);
    }
}

/// Points paid for a login at this streak length
pub fn daily_points(streak: u32) -> u64 {
    (u64::from(streak) * POINTS_PER_STREAK_DAY).min(MAX_DAILY_POINTS)
}

/// Rank title for a points total
pub fn rank_title(points: u64) -> &'static str {
    RANKS
        .iter()
        .rev()
        .find(|(threshold, _)| points >= *threshold)
        .map(|(_, title)| *title)
        .unwrap_or(RANKS[0].1)
}

/// First milestone above `points`
pub fn next_milestone(points: u64) -> Milestone {
    MILESTONES
        .iter()
        .find(|(threshold, _)| points < *threshold)
        .map(|(threshold, reward)| Milestone {
            milestone: *threshold,
            remaining: *threshold - points,
            reward: *reward,
        })
        .unwrap_or(Milestone {
            milestone: MILESTONES[MILESTONES.len() - 1].0,
            remaining: 0,
            reward: FINAL_REWARD,
        })
}

/// Display multiplier for a streak length
pub fn streak_bonus(streak: u32) -> f64 {
    if streak >= 100 {
        3.0
    } else if streak >= 30 {
        2.5
    } else if streak >= 7 {
        2.0
    } else if streak >= 3 {
        1.5
    } else {
        1.0
    }
}

/// Points with thousands separators, e.g. `12,345`
pub fn format_points(points: u64) -> String {
    let digits = points.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
