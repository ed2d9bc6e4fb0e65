//! Main application state and logic for the dashboard

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::KeyCode;
use tracing::{info, warn};

use crate::application::LiveTokenDashboard;
use crate::domain::{SortKey, TokenCategory, TokenView};
use crate::infrastructure::client::feed::{
    spawn_feed_client, FeedClientConfig, FeedEvent, FeedHandle, FeedStatus, SharedFeedStatus,
};
use crate::infrastructure::client::snapshot::{
    FixtureSnapshotSource, HttpSnapshotSource, SnapshotSource,
};
use crate::infrastructure::config::DashboardConfig;

/// Main application state
pub struct App {
    /// Token state and views
    pub dashboard: LiveTokenDashboard,
    /// Running feed client, if one was started
    feed: Option<FeedHandle>,
    /// Connection status shown in the header
    pub feed_status: SharedFeedStatus,
    /// Focused category column
    pub selected_column: usize,
    /// Selected row per column
    pub selected_rows: [usize; 3],
    /// Whether the detail pane is open
    pub detail_open: bool,
    /// Whether to quit
    pub should_quit: bool,
    /// Status message to show in footer
    pub status_message: Option<String>,
    /// Feed updates applied since start
    pub updates_applied: u64,
    /// true = keep running, false = shutdown requested
    shutdown_flag: Arc<AtomicBool>,
}

impl App {
    pub fn new(dashboard: LiveTokenDashboard, shutdown_flag: Arc<AtomicBool>) -> Self {
        Self {
            dashboard,
            feed: None,
            feed_status: Arc::new(FeedStatus::new()),
            selected_column: 0,
            selected_rows: [0; 3],
            detail_open: false,
            should_quit: false,
            status_message: None,
            updates_applied: 0,
            shutdown_flag,
        }
    }

    /// Bootstrap the token snapshot and start the feed client
    ///
    /// A failed bootstrap is not fatal: the error is shown in the UI and
    /// the store stays empty.
    pub async fn initialize(config: &DashboardConfig, shutdown_flag: Arc<AtomicBool>) -> Result<Self> {
        let mut dashboard = LiveTokenDashboard::new(config.simulation.volume_model());

        let source: Box<dyn SnapshotSource> = match &config.api.fixture_path {
            Some(path) => Box::new(FixtureSnapshotSource::new(path)),
            None => Box::new(HttpSnapshotSource::new(
                config.api.base_url.clone(),
                Duration::from_secs(config.api.request_timeout_secs),
            )?),
        };

        let mut status_message = None;
        match dashboard.bootstrap_from(source.as_ref()).await {
            Ok(count) => info!("[Dashboard] Loaded {} tokens", count),
            Err(e) => {
                warn!("[Dashboard] Bootstrap failed: {}", e);
                status_message = Some(format!("Failed to load tokens: {}", e));
            }
        }

        let mut app = Self::new(dashboard, Arc::clone(&shutdown_flag));
        app.status_message = status_message;

        let feed = spawn_feed_client(FeedClientConfig::from(&config.feed), shutdown_flag);
        app.feed_status = Arc::clone(&feed.status);
        app.feed = Some(feed);

        Ok(app)
    }

    // =========================================================================
    // Feed
    // =========================================================================

    /// Apply every queued feed event. Returns the number of events handled.
    pub fn pump_events(&mut self) -> usize {
        let events = match &self.feed {
            Some(feed) => feed.drain(),
            None => return 0,
        };
        let count = events.len();
        for event in events {
            self.handle_feed_event(event);
        }
        count
    }

    pub fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::PriceUpdate(update) => {
                if self.dashboard.apply_price_update(&update).is_some() {
                    self.updates_applied += 1;
                }
            }
            FeedEvent::Connected => {
                self.status_message = Some("Feed connected".to_string());
            }
            FeedEvent::Disconnected => {
                self.status_message = Some("Feed disconnected".to_string());
            }
            FeedEvent::Reconnecting(attempt) => {
                self.status_message = Some(format!("Reconnecting (attempt {})", attempt));
            }
            FeedEvent::GaveUp => {
                self.status_message = Some("Feed offline, reconnect attempts exhausted".to_string());
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn selected_category(&self) -> TokenCategory {
        TokenCategory::all()[self.selected_column]
    }

    /// Rows of the focused column
    pub fn selected_rows_view(&self) -> Arc<[TokenView]> {
        self.dashboard.category_view(self.selected_category())
    }

    /// Token under the cursor
    pub fn selected_token(&self) -> Option<TokenView> {
        let rows = self.selected_rows_view();
        let index = self.selected_rows[self.selected_column];
        rows.get(index.min(rows.len().saturating_sub(1))).cloned()
    }

    pub fn next_row(&mut self) {
        let len = self.selected_rows_view().len();
        if len > 0 {
            let row = &mut self.selected_rows[self.selected_column];
            *row = (*row + 1) % len;
        }
    }

    pub fn prev_row(&mut self) {
        let len = self.selected_rows_view().len();
        if len > 0 {
            let row = &mut self.selected_rows[self.selected_column];
            *row = if *row == 0 || *row >= len { len - 1 } else { *row - 1 };
        }
    }

    pub fn next_column(&mut self) {
        self.selected_column = (self.selected_column + 1) % TokenCategory::all().len();
        self.dashboard
            .set_active_category(Some(self.selected_category()));
    }

    pub fn prev_column(&mut self) {
        let count = TokenCategory::all().len();
        self.selected_column = (self.selected_column + count - 1) % count;
        self.dashboard
            .set_active_category(Some(self.selected_category()));
    }

    /// Open the detail pane for the token under the cursor
    pub fn open_detail(&mut self) {
        let Some(token) = self.selected_token() else {
            self.status_message = Some("No token selected".to_string());
            return;
        };
        if self.dashboard.observe(&token.id) {
            self.detail_open = true;
            self.status_message = None;
        }
    }

    pub fn close_detail(&mut self) {
        self.dashboard.stop_observing();
        self.detail_open = false;
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.dashboard.sort(key);
        self.status_message = Some(format!("Sorted by {}", key.label()));
    }

    pub fn cycle_chain_filter(&mut self) {
        let filter = self.dashboard.cycle_chain_filter();
        self.selected_rows = [0; 3];
        self.status_message = Some(format!("Chain filter: {}", filter));
    }

    /// Map a key press to an action
    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.prev_row(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.next_column(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.prev_column(),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Esc => self.close_detail(),
            KeyCode::Char('1') => self.sort_by(SortKey::MarketCap),
            KeyCode::Char('2') => self.sort_by(SortKey::Volume),
            KeyCode::Char('3') => self.sort_by(SortKey::Change1h),
            KeyCode::Char('4') => self.sort_by(SortKey::Change24h),
            KeyCode::Char('c') => self.cycle_chain_filter(),
            _ => {}
        }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) {
        info!("[Dashboard] Shutting down...");
        self.shutdown_flag.store(false, Ordering::Release);
        if let Some(feed) = self.feed.take() {
            feed.task.abort();
        }
    }
}
