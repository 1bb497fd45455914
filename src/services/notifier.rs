//! Desktop notifications and notification permission

use std::fmt;
use anyhow::Context;
use futures::future::{self, BoxFuture, FutureExt};
use notify_rust::Notification;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Whether notifications may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

/// Shows system notifications. `notify` must return without waiting for
/// the notification to be displayed.
pub trait Notifier: Send + Sync + fmt::Debug {
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()>;

    /// Ask for permission to notify. Resolves once the answer is known.
    fn request_permission(&self) -> BoxFuture<'static, Permission>;
}

/// Desktop notifications through the platform notification service
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("alertify")
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let runtime = Handle::try_current().context("Notifications need a tokio runtime")?;
        debug!("Sending desktop notification: {}", title);

        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(title)
            .body(body);

        // show() blocks until the notification service answers
        runtime.spawn_blocking(move || {
            if let Err(e) = notification.show() {
                warn!("Failed to show notification: {}", e);
            }
        });

        Ok(())
    }

    fn request_permission(&self) -> BoxFuture<'static, Permission> {
        async {
            match tokio::task::spawn_blocking(check_notification_server).await {
                Ok(permission) => permission,
                Err(e) => {
                    warn!("Notification permission check failed: {}", e);
                    Permission::Denied
                }
            }
        }
        .boxed()
    }
}

/// Granted when a notification server is listening on the session bus
#[cfg(all(unix, not(target_os = "macos")))]
fn check_notification_server() -> Permission {
    match notify_rust::get_server_information() {
        Ok(server) => {
            info!(
                "Notification server {} {} found, notifications granted",
                server.name, server.version
            );
            Permission::Granted
        }
        Err(e) => {
            info!("No notification server ({}), notifications denied", e);
            Permission::Denied
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn check_notification_server() -> Permission {
    info!("Desktop notifications granted");
    Permission::Granted
}

/// Notifier for sessions that opted out of notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn notify(&self, _title: &str, _body: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn request_permission(&self) -> BoxFuture<'static, Permission> {
        future::ready(Permission::Denied).boxed()
    }
}
