//! User record and badge set

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::day_string;

/// Badge granted to every freshly registered account
pub const WELCOME_BADGE: &str = "First Steps";
/// Points granted at registration
pub const WELCOME_POINTS: u64 = 100;

/// Insertion-ordered set of badge names
///
/// Duplicates are dropped on insert and when loading persisted data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Badges(Vec<String>);

impl Badges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a badge; returns false if it was already held
    pub fn insert(&mut self, badge: &str) -> bool {
        if self.contains(badge) {
            return false;
        }
        self.0.push(badge.to_string());
        true
    }

    pub fn contains(&self, badge: &str) -> bool {
        self.0.iter().any(|b| b == badge)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Badges {
    fn from(raw: Vec<String>) -> Self {
        let mut badges = Badges::new();
        for badge in &raw {
            badges.insert(badge);
        }
        badges
    }
}

impl From<Badges> for Vec<String> {
    fn from(badges: Badges) -> Self {
        badges.0
    }
}

impl<const N: usize> From<[&str; N]> for Badges {
    fn from(raw: [&str; N]) -> Self {
        let mut badges = Badges::new();
        for badge in raw {
            badges.insert(badge);
        }
        badges
    }
}

/// Older records may carry `"badges": null`
fn badges_or_null<'de, D>(deserializer: D) -> Result<Badges, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?
        .map(Badges::from)
        .unwrap_or_default())
}

/// Profile fields collected at registration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Durable account state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// RFC 3339 creation time
    pub created_at: String,

    pub login_streak: u32,
    pub total_logins: u32,
    /// Calendar-day string of the last successful login
    pub last_login_date: String,
    pub points: u64,
    #[serde(default, deserialize_with = "badges_or_null")]
    pub badges: Badges,
    #[serde(default)]
    pub joined_friends: u32,
}

impl User {
    /// Seed record for a new registration
    ///
    /// The registration itself counts as the first login of the first day.
    pub fn new_registration(profile: Profile, now: DateTime<Local>) -> Self {
        Self {
            id: profile.email.clone(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
            created_at: now
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            login_streak: 1,
            total_logins: 1,
            last_login_date: day_string(now),
            points: WELCOME_POINTS,
            badges: Badges::from([WELCOME_BADGE]),
            joined_friends: 0,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> Profile {
        Profile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+447700900123".to_string(),
        }
    }

    #[test]
    fn test_badges_reject_duplicates() {
        let mut badges = Badges::new();
        assert!(badges.insert("Streaker"));
        assert!(!badges.insert("Streaker"));
        assert_eq!(badges.len(), 1);
    }

    #[test]
    fn test_badges_dedupe_on_load() {
        let badges: Badges = serde_json::from_str(r#"["A","B","A"]"#).unwrap();
        assert_eq!(badges.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_new_registration_seed() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let user = User::new_registration(profile(), now);

        assert_eq!(user.id, "ada@example.com");
        assert_eq!(user.login_streak, 1);
        assert_eq!(user.total_logins, 1);
        assert_eq!(user.points, 100);
        assert_eq!(user.last_login_date, "Sun Oct 18 2026");
        assert!(user.badges.contains(WELCOME_BADGE));
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let json = serde_json::to_value(User::new_registration(profile(), now)).unwrap();

        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["loginStreak"], 1);
        assert_eq!(json["badges"][0], "First Steps");
    }

    #[test]
    fn test_missing_badges_default_to_empty() {
        let json = r#"{
            "id": "x@y.z", "firstName": "X", "lastName": "Y", "email": "x@y.z",
            "phone": "+15550100", "createdAt": "2026-01-01T00:00:00.000Z",
            "loginStreak": 0, "totalLogins": 0, "lastLoginDate": "", "points": 0
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.badges.is_empty());
    }

    #[test]
    fn test_null_badges_read_as_empty() {
        let json = r#"{
            "id": "x@y.z", "firstName": "X", "lastName": "Y", "email": "x@y.z",
            "phone": "+15550100", "createdAt": "2026-01-01T00:00:00.000Z",
            "loginStreak": 2, "totalLogins": 4, "lastLoginDate": "", "points": 40,
            "badges": null
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.badges.is_empty());
        assert_eq!(user.total_logins, 4);
    }
}
