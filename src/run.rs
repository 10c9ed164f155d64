use crate::error::{Result, WatchError};
use crate::feed::types::Item;
use crate::feed::ItemFeed;
use crate::filter::{RuleSet, Verdict};
use crate::mail::Mailer;
use crate::render::DigestRenderer;
use crate::seen::{SeenSet, SeenStore};

/// How a run ended. Errors that abort a run (state load, render, delivery)
/// are returned as `Err` instead.
#[derive(Debug)]
pub enum RunOutcome {
    /// Feed fetched but nothing new matched.
    NothingNew { fetched: usize },
    /// Digest delivered and state saved.
    Delivered { count: usize },
    /// Digest delivered but state could not be saved; the same items will be
    /// offered again next run.
    DeliveredNotPersisted { count: usize, error: WatchError },
    /// Feed unreachable or malformed; state untouched.
    FeedUnavailable { error: WatchError },
    /// Digest rendered only; nothing sent or saved.
    DryRun { count: usize },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::NothingNew { .. } | RunOutcome::Delivered { .. } | RunOutcome::DryRun { .. } => 0,
            RunOutcome::DeliveredNotPersisted { error, .. } | RunOutcome::FeedUnavailable { error } => {
                error.exit_code()
            }
        }
    }
}

/// Everything one run needs; built once in `main`.
pub struct Watcher<F: ItemFeed, M: Mailer> {
    pub subreddit: String,
    pub feed: F,
    pub mailer: M,
    pub store: SeenStore,
    pub rules: RuleSet,
    pub renderer: DigestRenderer,
    pub dry_run: bool,
}

impl<F: ItemFeed, M: Mailer> Watcher<F, M> {
    /// fetch → dedupe → filter → render → deliver → persist.
    pub async fn run_once(&mut self) -> Result<RunOutcome> {
        let mut seen = self.store.load()?;
        tracing::debug!(known = seen.len(), "state loaded");

        let items = match self.feed.fetch_items(&self.subreddit).await {
            Ok(items) => items,
            Err(error @ (WatchError::Fetch { .. } | WatchError::Parse { .. })) => {
                tracing::error!(subreddit = %self.subreddit, error = %error, "feed unavailable, state left unchanged");
                return Ok(RunOutcome::FeedUnavailable { error });
            }
            Err(other) => return Err(other),
        };
        let fetched = items.len();

        let new_items = select_new(items, &mut seen, &self.rules);
        if new_items.is_empty() {
            tracing::info!(fetched, "no new matching posts");
            return Ok(RunOutcome::NothingNew { fetched });
        }
        let count = new_items.len();

        let html = self.renderer.render(&new_items)?;

        if self.dry_run {
            for item in &new_items {
                tracing::info!(id = %item.id, title = %item.title, "DRY RUN: would include");
            }
            tracing::info!(count, bytes = html.len(), "DRY RUN: digest rendered, not sent");
            return Ok(RunOutcome::DryRun { count });
        }

        // On failure `seen` is dropped here, so nothing is marked as sent.
        self.mailer.deliver(&html).await?;
        tracing::debug!(count, "digest accepted by relay");

        match self.store.save(&seen) {
            Ok(()) => {
                tracing::info!(count, known = seen.len(), "sent digest with {} new posts", count);
                Ok(RunOutcome::Delivered { count })
            }
            Err(error) => {
                tracing::error!(
                    path = %self.store.path().display(),
                    error = %error,
                    count,
                    "digest sent but state NOT saved; these posts will be sent again next run"
                );
                Ok(RunOutcome::DeliveredNotPersisted { count, error })
            }
        }
    }
}

/// Walk `items` in feed order, keeping unseen matches and marking them seen.
pub fn select_new(items: Vec<Item>, seen: &mut SeenSet, rules: &RuleSet) -> Vec<Item> {
    let mut out = Vec::new();
    for item in items {
        if seen.contains(&item.id) {
            continue;
        }
        match rules.evaluate(&item) {
            Verdict::Match => {
                seen.insert(item.id.clone());
                out.push(item);
            }
            verdict => {
                tracing::debug!(id = %item.id, title = %item.title, ?verdict, "filtered out");
            }
        }
    }
    out
}
