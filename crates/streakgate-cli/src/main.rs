//! Streakgate - command-line front end for the login guard

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streakgate_core::{
    config::CONFIG_FILE,
    identity::secret_key,
    scoring::{format_points, next_milestone, rank_title, streak_bonus},
    validate_login, FileStore, GuardConfig, GuardError, LoginForm, LoginGuard, NoBiometrics,
    NotificationCategory, NotificationFeed, RecordStore, RegistrationDraftStore, RegistrationForm,
    SecretStore, SystemClock, User,
};

/// Streakgate - local account login with daily streaks
#[derive(Parser, Debug)]
#[command(name = "streakgate")]
#[command(about = "Login guard with lockout, streaks, points and badges")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the store files (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account and log it in
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// International format, e.g. +15551234567
        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user and their progress
    Whoami,

    /// Show attempts left before lockout
    Attempts {
        #[arg(long)]
        email: String,
    },

    /// Clear failed attempts and any lockout
    Unlock {
        #[arg(long)]
        email: String,
    },

    /// Log in with biometrics
    Biometric,

    /// Show the rank and next milestone for a points total
    Rank {
        #[arg(long)]
        points: u64,
    },

    /// Engagement notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
}

#[derive(Subcommand, Debug)]
enum NotificationAction {
    /// List notifications, newest first
    List,

    /// Add a notification
    Add {
        #[arg(long, value_enum)]
        category: CategoryArg,

        #[arg(long)]
        message: String,
    },

    /// Mark a notification read
    Read {
        #[arg(long)]
        id: String,
    },

    /// Add a random daily prompt
    Daily,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    FriendJoined,
    PostMissed,
    AchievementUnlocked,
    StreakReminder,
}

impl From<CategoryArg> for NotificationCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::FriendJoined => NotificationCategory::FriendJoined,
            CategoryArg::PostMissed => NotificationCategory::PostMissed,
            CategoryArg::AchievementUnlocked => NotificationCategory::AchievementUnlocked,
            CategoryArg::StreakReminder => NotificationCategory::StreakReminder,
        }
    }
}

/// Stores and services for one invocation
struct App {
    guard: LoginGuard,
    feed: NotificationFeed,
    drafts: RegistrationDraftStore,
}

impl App {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = load_config(cli)?;
        config.ensure_directories()?;
        info!("Using data directory {:?}", config.data_dir);

        let secrets: Arc<dyn SecretStore> = Arc::new(
            FileStore::new(config.secrets_path()).context("Failed to open secrets store")?,
        );
        let records: Arc<dyn RecordStore> = Arc::new(
            FileStore::new(config.records_path()).context("Failed to open records store")?,
        );
        let clock = Arc::new(SystemClock);

        Ok(Self {
            guard: LoginGuard::new(
                secrets,
                records.clone(),
                config.lockout_policy(),
                Arc::new(NoBiometrics),
                clock.clone(),
            ),
            feed: NotificationFeed::with_capacity(
                records.clone(),
                clock,
                config.notification_capacity,
            ),
            drafts: RegistrationDraftStore::new(records),
        })
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<GuardConfig> {
    let mut config = match &cli.config {
        Some(path) => GuardConfig::load(path)?,
        None => {
            let default_dir = cli
                .data_dir
                .clone()
                .unwrap_or_else(|| GuardConfig::default().data_dir);
            GuardConfig::load_or_default(&default_dir.join(CONFIG_FILE))?
        }
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn print_user(user: &User) {
    println!("\n=== {} ===\n", user.display_name());
    println!("Email:        {}", user.email);
    println!("Rank:         {}", rank_title(user.points));
    println!("Points:       {}", format_points(user.points));
    println!(
        "Streak:       {} day(s) (x{:.1} bonus)",
        user.login_streak,
        streak_bonus(user.login_streak)
    );
    println!("Total logins: {}", user.total_logins);

    let badges: Vec<&str> = user.badges.iter().collect();
    if badges.is_empty() {
        println!("Badges:       none");
    } else {
        println!("Badges:       {}", badges.join(", "));
    }

    let milestone = next_milestone(user.points);
    if milestone.remaining > 0 {
        println!(
            "Next:         {} in {} points",
            milestone.reward,
            format_points(milestone.remaining)
        );
    } else {
        println!("Next:         {}", milestone.reward);
    }
}

/// Log line for a refused login; identities are logged sanitized
fn failed_login_event(email: &str) -> String {
    format!("Login failed for {}", secret_key(email))
}

async fn lockout_status(guard: &LoginGuard, email: &str) -> String {
    let policy = guard.policy();
    let failed = policy
        .max_attempts
        .saturating_sub(guard.remaining_attempts(email).await);
    let locked_for = guard
        .lockout_remaining(email)
        .await
        .map(Duration::from_secs);
    policy.describe_lockout(failed, locked_for)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Rank { points } = cli.command {
        let milestone = next_milestone(points);
        println!("{} ({} points)", rank_title(points), format_points(points));
        println!(
            "Next milestone: {} at {} ({} to go)",
            milestone.reward,
            format_points(milestone.milestone),
            format_points(milestone.remaining)
        );
        return Ok(());
    }

    let app = App::open(&cli)?;
    let guard = &app.guard;

    match cli.command {
        Commands::Register {
            first_name,
            last_name,
            email,
            phone,
            password,
        } => {
            let form = RegistrationForm {
                first_name,
                last_name,
                email,
                password,
                phone,
            };
            let user = guard.register_form(&form).await?;
            app.drafts.clear().await;

            println!("Welcome, {}!", user.display_name());
            print_user(&user);
        }

        Commands::Login { email, password } => {
            let form = validate_login(&LoginForm { email, password })?;

            match guard.login(&form.email, &form.password).await {
                Ok(Some(user)) => print_user(&user),
                Ok(None) => println!("Logged in as {} (no profile on record)", form.email),
                Err(GuardError::InvalidCredentials) => {
                    warn!("{}", failed_login_event(&form.email));
                    println!("{}", lockout_status(guard, &form.email).await);
                    return Err(GuardError::InvalidCredentials.into());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Logout => {
            guard.logout().await;
            println!("Logged out");
        }

        Commands::Whoami => match guard.current_user().await {
            Some(user) => print_user(&user),
            None if guard.is_logged_in().await => println!("Logged in, but no profile on record"),
            None => println!("Not logged in"),
        },

        Commands::Attempts { email } => {
            let left = guard.remaining_attempts(&email).await;
            let locked = guard.lockout_remaining(&email).await.is_some();

            if left == 0 && !locked {
                // Window elapsed but nothing has cleared it yet
                guard.reset_attempts(&email).await;
                println!("Lockout expired, attempts reset");
            } else {
                println!("{}", lockout_status(guard, &email).await);
            }
        }

        Commands::Unlock { email } => {
            guard.reset_attempts(&email).await;
            println!("Attempts reset for {}", email);
        }

        Commands::Biometric => {
            let user = guard.biometric_login().await?;
            print_user(&user);
        }

        Commands::Notifications { action } => match action {
            NotificationAction::List => {
                let items = app.feed.list().await;
                if items.is_empty() {
                    println!("No notifications");
                }
                for item in items {
                    println!(
                        "{} {} [{:?}] {}",
                        if item.read { " " } else { "*" },
                        item.id,
                        item.category,
                        item.message
                    );
                }
            }
            NotificationAction::Add { category, message } => {
                app.feed.add(category.into(), message).await;
                println!("Notification added");
            }
            NotificationAction::Read { id } => {
                app.feed.mark_read(&id).await;
                println!("{} unread", app.feed.unread_count().await);
            }
            NotificationAction::Daily => {
                let category = app.feed.generate_daily(&mut rand::thread_rng()).await;
                println!("Added {:?} prompt", category);
            }
        },

        Commands::Rank { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streakgate=info,streakgate_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let data_dir = dir.path().to_string_lossy().to_string();
        let mut argv = vec!["streakgate", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_failed_login_event_hides_raw_email() {
        let event = failed_login_event("ada.lovelace@example.com");
        assert_eq!(event, "Login failed for ada_lovelace_example_com");
        assert!(!event.contains('@'));
    }

    #[test]
    fn test_parse_register() {
        let parsed = Cli::try_parse_from([
            "streakgate",
            "register",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--phone",
            "+447700900123",
            "--password",
            "Engine1843",
        ])
        .unwrap();
        assert!(matches!(parsed.command, Commands::Register { .. }));
        assert!(parsed.data_dir.is_none());
    }

    #[test]
    fn test_parse_notification_category() {
        let parsed = Cli::try_parse_from([
            "streakgate",
            "notifications",
            "add",
            "--category",
            "friend-joined",
            "--message",
            "hi",
        ])
        .unwrap();
        assert!(matches!(
            parsed.command,
            Commands::Notifications {
                action: NotificationAction::Add {
                    category: CategoryArg::FriendJoined,
                    ..
                }
            }
        ));
    }

    #[tokio::test]
    async fn test_register_login_logout_flow() {
        let dir = TempDir::new().unwrap();
        run(cli(
            &dir,
            &[
                "register",
                "--first-name",
                "Ada",
                "--last-name",
                "Lovelace",
                "--email",
                "ada@example.com",
                "--phone",
                "+447700900123",
                "--password",
                "Engine1843",
            ],
        ))
        .await
        .unwrap();
        assert!(dir.path().join("secrets.json").exists());
        assert!(dir.path().join("records.json").exists());

        run(cli(&dir, &["logout"])).await.unwrap();

        let err = run(cli(&dir, &["login", "--email", "ada@example.com", "--password", "nope"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GuardError>(),
            Some(GuardError::InvalidCredentials)
        ));

        run(cli(&dir, &["login", "--email", "ada@example.com", "--password", "Engine1843"]))
            .await
            .unwrap();
        run(cli(&dir, &["whoami"])).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let dir = TempDir::new().unwrap();
        let err = run(cli(
            &dir,
            &[
                "register",
                "--first-name",
                "Ada",
                "--last-name",
                "Lovelace",
                "--email",
                "ada@example.com",
                "--phone",
                "+447700900123",
                "--password",
                "weak",
            ],
        ))
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GuardError>(),
            Some(GuardError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_biometric_unavailable_on_terminal() {
        let dir = TempDir::new().unwrap();
        let err = run(cli(&dir, &["biometric"])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GuardError>(),
            Some(GuardError::BiometricUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_notifications_and_rank() {
        let dir = TempDir::new().unwrap();
        run(cli(&dir, &["notifications", "daily"])).await.unwrap();
        run(cli(&dir, &["notifications", "list"])).await.unwrap();
        run(cli(&dir, &["rank", "--points", "1500"])).await.unwrap();
        run(cli(&dir, &["unlock", "--email", "ada@example.com"])).await.unwrap();
        run(cli(&dir, &["attempts", "--email", "ada@example.com"])).await.unwrap();
    }
}
