//! Per-user profile document and its counters.
//!
//! Field names follow the stored document layout (`pdfCount`,
//! `stats.learningStreak`, `dailyActivity`, ...), so profiles written by
//! other clients of the same store load unchanged.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Score;
use crate::session::UserContext;
use crate::traits::ProfileStore;

const DEFAULT_DISPLAY_NAME: &str = "Student";

/// The stored profile of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default)]
    pub stats: UserStats,
    /// Subject name → score.
    #[serde(default)]
    pub subjects: BTreeMap<String, u32>,
    #[serde(default)]
    pub activities: Activities,
    /// `YYYY-MM-DD` → questions answered that day.
    #[serde(default)]
    pub daily_activity: BTreeMap<String, u32>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Number of PDFs uploaded.
    #[serde(default)]
    pub pdf_count: u64,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub questions_asked: u64,
    #[serde(default)]
    pub accuracy_rate: f64,
    #[serde(default)]
    pub topics_mastered: u64,
    /// Consecutive days with activity, ending at the last recorded day.
    #[serde(default)]
    pub learning_streak: u32,
}

/// Partial update of [`UserStats`]; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct StatsPatch {
    pub questions_asked: Option<u64>,
    pub accuracy_rate: Option<f64>,
    pub topics_mastered: Option<u64>,
    pub learning_streak: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activities {
    #[serde(default)]
    pub practice: u32,
    #[serde(default)]
    pub quizzes: u32,
    #[serde(default)]
    pub challenges: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    /// Free-form due date as entered by the user.
    pub due: String,
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl UserProfile {
    /// A fresh profile with the starter values new users get.
    pub fn new_for(user: &UserContext, now: DateTime<Utc>) -> Self {
        let subjects = [("Math", 85), ("Science", 78), ("History", 92), ("English", 88)]
            .into_iter()
            .map(|(name, score)| (name.to_string(), score))
            .collect();

        let mut daily_activity = BTreeMap::new();
        daily_activity.insert(day_key(now.date_naive()), 0);

        Self {
            uid: user.uid.clone(),
            email: user.email.clone().unwrap_or_default(),
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            photo_url: user.photo_url.clone().unwrap_or_default(),
            stats: UserStats::default(),
            subjects,
            activities: Activities {
                practice: 40,
                quizzes: 35,
                challenges: 25,
            },
            daily_activity,
            assignments: Vec::new(),
            pdf_count: 0,
            last_login: now,
            created_at: now,
        }
    }

    /// Update login time and take the identity fields the sign-in provides.
    pub fn refresh_login(&mut self, user: &UserContext, now: DateTime<Utc>) {
        self.last_login = now;
        if let Some(name) = &user.display_name {
            self.display_name = name.clone();
        }
        if let Some(photo) = &user.photo_url {
            self.photo_url = photo.clone();
        }
    }

    /// Add `questions` to the count for `today` and refresh the streak.
    pub fn add_daily_activity(&mut self, today: NaiveDate, questions: u32) {
        *self.daily_activity.entry(day_key(today)).or_insert(0) += questions;
        self.stats.learning_streak = self.streak_on(today);
    }

    /// Consecutive active days ending at `today`, or at yesterday when
    /// nothing has been recorded today yet.
    pub fn streak_on(&self, today: NaiveDate) -> u32 {
        let active = |day: NaiveDate| {
            self.daily_activity
                .get(&day_key(day))
                .is_some_and(|&count| count > 0)
        };

        let mut day = today;
        if !active(day) {
            match day.checked_sub_days(Days::new(1)) {
                Some(yesterday) => day = yesterday,
                None => return 0,
            }
        }

        let mut streak = 0;
        while active(day) {
            streak += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(previous) => day = previous,
                None => break,
            }
        }
        streak
    }

    pub fn apply_stats(&mut self, patch: &StatsPatch) {
        if let Some(v) = patch.questions_asked {
            self.stats.questions_asked = v;
        }
        if let Some(v) = patch.accuracy_rate {
            self.stats.accuracy_rate = v;
        }
        if let Some(v) = patch.topics_mastered {
            self.stats.topics_mastered = v;
        }
        if let Some(v) = patch.learning_streak {
            self.stats.learning_streak = v;
        }
    }

    /// Fold a scored quiz into the counters.
    pub fn apply_quiz_result(&mut self, score: &Score, questions: usize, today: NaiveDate) {
        self.stats.questions_asked += questions as u64;
        self.stats.accuracy_rate = score.percentage;
        self.activities.quizzes += 1;
        self.add_daily_activity(today, questions as u32);
    }
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

/// Load the signed-in user's profile, creating it on first sign-in.
pub async fn create_or_refresh_profile(
    store: &dyn ProfileStore,
    user: &UserContext,
    now: DateTime<Utc>,
) -> Result<UserProfile> {
    let profile = match store.get(&user.uid).await? {
        Some(mut existing) => {
            existing.refresh_login(user, now);
            existing
        }
        None => {
            tracing::info!(uid = %user.uid, store = store.name(), "creating user profile");
            UserProfile::new_for(user, now)
        }
    };
    store.put(&profile).await?;
    Ok(profile)
}

/// Read-modify-write a profile. Returns `None` without writing when the
/// user has no profile.
pub async fn update_profile<F>(
    store: &dyn ProfileStore,
    uid: &str,
    update: F,
) -> Result<Option<UserProfile>>
where
    F: FnOnce(&mut UserProfile) + Send,
{
    let Some(mut profile) = store.get(uid).await? else {
        tracing::debug!(uid, "no profile to update");
        return Ok(None);
    };
    update(&mut profile);
    store.put(&profile).await?;
    Ok(Some(profile))
}

/// Bump the uploaded-PDF counter, returning the new value.
pub async fn increment_pdf_count(store: &dyn ProfileStore, uid: &str) -> Result<Option<u64>> {
    let updated = update_profile(store, uid, |p| p.pdf_count += 1).await?;
    Ok(updated.map(|p| p.pdf_count))
}

pub async fn record_daily_activity(
    store: &dyn ProfileStore,
    uid: &str,
    today: NaiveDate,
    questions: u32,
) -> Result<Option<UserProfile>> {
    update_profile(store, uid, |p| p.add_daily_activity(today, questions)).await
}

pub async fn record_quiz_result(
    store: &dyn ProfileStore,
    uid: &str,
    score: &Score,
    questions: usize,
    today: NaiveDate,
) -> Result<Option<UserProfile>> {
    let score = *score;
    update_profile(store, uid, move |p| {
        p.apply_quiz_result(&score, questions, today)
    })
    .await
}

pub async fn add_assignment(
    store: &dyn ProfileStore,
    uid: &str,
    assignment: Assignment,
) -> Result<Option<UserProfile>> {
    update_profile(store, uid, move |p| p.assignments.push(assignment)).await
}

pub async fn update_stats(
    store: &dyn ProfileStore,
    uid: &str,
    patch: &StatsPatch,
) -> Result<Option<UserProfile>> {
    update_profile(store, uid, |p| p.apply_stats(patch)).await
}

pub async fn update_subjects(
    store: &dyn ProfileStore,
    uid: &str,
    subjects: BTreeMap<String, u32>,
) -> Result<Option<UserProfile>> {
    update_profile(store, uid, move |p| p.subjects = subjects).await
}
