//! Application state and command handlers.
//!
//! `App` owns the single `Session` for the process and hands it to the API
//! client and session manager; command handlers print their results.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use rendezvous_core::api::ApiError;
use rendezvous_core::models::Profile;
use rendezvous_core::utils::parse_interests;
use rendezvous_core::{ApiClient, Config, Session, SessionManager, SessionStatus};

use crate::render;

/// Environment variable for non-interactive login
const PASSWORD_ENV: &str = "RENDEZVOUS_PASSWORD";

pub struct App {
    pub config: Config,
    manager: SessionManager,
}

impl App {
    pub fn new(config: Config, api_url: Option<String>) -> Result<Self> {
        let store = config.token_store()?;
        let session = Arc::new(Session::new(store));

        let base_url = api_url.unwrap_or_else(|| config.api_base_url());
        debug!(%base_url, token_store = ?config.token_store, "API client configured");
        let api = ApiClient::new(&base_url, session)?;

        Ok(Self {
            config,
            manager: SessionManager::new(api),
        })
    }

    fn api(&self) -> &ApiClient {
        self.manager.api()
    }

    pub fn session_expired(&self) -> bool {
        self.manager.session().status() == SessionStatus::Expired
    }

    /// Restore the stored session or fail with a login hint
    async fn require_session(&self) -> Result<Profile> {
        match self.manager.restore_session().await? {
            Some(profile) => Ok(profile),
            None => Err(anyhow::anyhow!(
                "Not logged in. Run `rendezvous login` first."
            )),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => Self::prompt_username()?,
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => password,
            _ => rpassword::prompt_password(format!("Password for {}: ", username))?,
        };

        match self.manager.login(&username, &password).await {
            Ok(()) => {
                self.config.last_username = Some(username.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                info!("Login successful");
                println!("Logged in as {}", username);
                Ok(())
            }
            Err(ApiError::Authentication(message)) => Err(anyhow::anyhow!(message)),
            Err(e) => Err(e).context("Login failed"),
        }
    }

    fn prompt_username() -> Result<String> {
        print!("Username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        Ok(username.trim().to_string())
    }

    pub fn logout(&self) {
        self.manager.logout();
        println!("Logged out");
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub async fn status(&self) -> Result<()> {
        let Some(profile) = self.manager.restore_session().await? else {
            println!("Not logged in");
            return Ok(());
        };

        let (meetings, notifications) = futures::try_join!(
            self.api().fetch_meetings(),
            self.api().fetch_notifications()
        )?;

        print!(
            "{}",
            render::render_status(&profile, &meetings, &notifications, Utc::now())
        );
        Ok(())
    }

    pub async fn profile(&self) -> Result<()> {
        let profile = self.require_session().await?;
        print!("{}", render::render_profile(&profile));
        Ok(())
    }

    pub async fn update_interests(&self, input: &str) -> Result<()> {
        self.require_session().await?;

        let names = parse_interests(input);
        let profile = self
            .api()
            .update_interests(&names)
            .await
            .context("Failed to update profile")?;

        println!("Profile updated successfully!");
        print!("{}", render::render_profile(&profile));
        Ok(())
    }

    pub async fn meetings(&self, upcoming: bool, calendar: Option<i64>) -> Result<()> {
        let profile = self.require_session().await?;
        let meetings = self
            .api()
            .fetch_meetings()
            .await
            .context("Failed to load meetings")?;

        if let Some(id) = calendar {
            let meeting = meetings
                .iter()
                .find(|m| m.id == id)
                .ok_or_else(|| anyhow::anyhow!("No meeting with id {}", id))?;
            return match self.api().fetch_meeting_calendar(meeting).await? {
                Some(ics) => {
                    print!("{}", ics);
                    Ok(())
                }
                None => Err(anyhow::anyhow!("Meeting {} has no calendar export", id)),
            };
        }

        let now = Utc::now();
        let shown: Vec<_> = meetings
            .into_iter()
            .filter(|m| !upcoming || m.is_upcoming(now))
            .collect();
        print!(
            "{}",
            render::render_meetings(&shown, &profile.username, now)
        );
        Ok(())
    }

    pub async fn whos_here(&self) -> Result<()> {
        let profile = self.require_session().await?;
        let attendees = self
            .api()
            .fetch_whos_here()
            .await
            .context("Failed to load who's here list")?;
        print!("{}", render::render_directory(&attendees, &profile));
        Ok(())
    }

    pub async fn notifications(&self, mark_read: Option<i64>) -> Result<()> {
        self.require_session().await?;

        if let Some(id) = mark_read {
            self.api()
                .mark_notification_read(id)
                .await
                .context("Failed to mark notification as read")?;
        }

        let notifications = self
            .api()
            .fetch_notifications()
            .await
            .context("Failed to load notifications")?;
        print!("{}", render::render_notifications(&notifications));
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        let health = self.api().health_check().await?;
        println!(
            "{}: {}",
            health.status,
            health.message.as_deref().unwrap_or("no message")
        );
        if health.is_ok() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("API reported status {}", health.status))
        }
    }
}
