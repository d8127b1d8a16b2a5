//! Cookie change interceptor
//!
//! Runs headless: it reacts to every change event of the host cookie store,
//! reads the rules fresh for each event and issues the corrective mutation.
//! Failures are logged and never retried. A user edit racing a lock
//! re-assertion is resolved by whichever write lands last; the rules converge
//! eventually, nothing here is transactional.

use std::sync::Arc;

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::cookie::{CookieChange, RemoveDetails, SetDetails};
use crate::host::CookieApi;
use crate::policy::{PolicyStore, Verdict};

/// Outcome of handling one change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    Allowed,
    Removed,
    Restored,
    Failed(String),
}

pub struct ChangeInterceptor {
    cookies: Arc<dyn CookieApi>,
    policy: PolicyStore,
}

impl ChangeInterceptor {
    pub fn new(cookies: Arc<dyn CookieApi>, policy: PolicyStore) -> Self {
        Self { cookies, policy }
    }

    /// Apply the rules to a single change event
    pub async fn handle(&self, change: &CookieChange) -> Enforcement {
        let settings = match self.policy.load().await {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("Failed to read cookie rules: {}", err);
                return Enforcement::Failed(err.to_string());
            }
        };

        let cookie = &change.cookie;
        match settings.verdict(change) {
            Verdict::Allow => Enforcement::Allowed,
            Verdict::Remove => match self.cookies.remove(&RemoveDetails::for_cookie(cookie)).await {
                Ok(_) => {
                    log::info!("Blacklisted cookie removed: {}", cookie.name);
                    Enforcement::Removed
                }
                Err(err) => {
                    log::error!("Failed to remove blacklisted cookie {}: {}", cookie.name, err);
                    Enforcement::Failed(err.to_string())
                }
            },
            Verdict::Restore(locked) => {
                let details = SetDetails::replacing_value(cookie, &locked);
                match self.cookies.set(&details).await {
                    Ok(Some(_)) => {
                        log::info!("Locked cookie restored: {} -> {}", cookie.name, locked);
                        Enforcement::Restored
                    }
                    Ok(None) => {
                        let reason = format!("lock on {} wrote an expired cookie", cookie.name);
                        log::error!("Failed to restore locked cookie: {}", reason);
                        Enforcement::Failed(reason)
                    }
                    Err(err) => {
                        log::error!("Failed to restore locked cookie {}: {}", cookie.name, err);
                        Enforcement::Failed(err.to_string())
                    }
                }
            }
        }
    }

    /// Handle every event already queued on `changes`, including the ones the
    /// corrections themselves produce. Returns the number of events handled.
    pub async fn drain(&self, changes: &mut broadcast::Receiver<CookieChange>) -> usize {
        let mut handled = 0;
        loop {
            match changes.try_recv() {
                Ok(change) => {
                    self.handle(&change).await;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Cookie change stream lagged, {} events skipped", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    /// Handle events until the host closes the change stream
    pub async fn run(&self, mut changes: broadcast::Receiver<CookieChange>) {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    self.handle(&change).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Cookie change stream lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        log::debug!("Cookie change stream closed");
    }
}
