//! Page creation: validate, attach, race navigation, connect.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frame::{Frame, SiteLoader};
use crate::identifiers::ChannelId;
use crate::rpc::RpcClient;
use crate::scripts::ScriptRegistry;

use super::options::PageOptions;
use super::proxy::Page;

// ============================================================================
// PageBuilder
// ============================================================================

/// Builder assembling everything a [`Page`] needs before attachment.
///
/// `location`, `options` and `loader` are mandatory; the script registry
/// defaults to empty and the channel tag to a freshly generated one.
#[derive(Default)]
pub struct PageBuilder {
    location: Option<String>,
    options: Option<PageOptions>,
    loader: Option<Arc<dyn SiteLoader>>,
    scripts: ScriptRegistry,
    channel: Option<ChannelId>,
}

impl PageBuilder {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the navigation target.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the page options.
    #[must_use]
    pub fn options(mut self, options: PageOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets the site loader resolving the location to HTML.
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn SiteLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Installs the script registry the guest will evaluate from.
    #[must_use]
    pub fn scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    /// Overrides the channel tag instead of generating one per page.
    #[must_use]
    pub fn channel(mut self, channel: ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Creates the page: validates the options, attaches the frame, races
    /// navigation against the configured timeout and connects the client.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when a mandatory field is missing or an option is
    ///   invalid; the frame is never attached in that case.
    /// - [`Error::NavigationFailed`] when the loader rejects the location.
    /// - [`Error::NavigationTimeout`] when the load signal loses the race.
    /// - [`Error::SiteLoad`] when the guest went away right after loading.
    pub async fn create(self) -> Result<Page> {
        let location = self
            .location
            .ok_or_else(|| Error::config("the location option is mandatory"))?;
        let options = self
            .options
            .ok_or_else(|| Error::config("the page options are mandatory"))?;
        let loader = self
            .loader
            .ok_or_else(|| Error::config("a site loader is mandatory"))?;

        // Reject bad options before any guest work starts.
        options.validate()?;

        let channel = self.channel.unwrap_or_else(ChannelId::generate);
        debug!(location = %location, channel = %channel, "Creating page");

        let mut handles = Frame::attach(
            &location,
            options.viewport(),
            channel.clone(),
            loader,
            Arc::new(self.scripts),
        );

        match time::timeout(options.navigation_timeout(), handles.load_rx).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                warn!(location = %location, error = %e, "Navigation failed");
                handles.frame.detach();
                return Err(e);
            }
            Ok(Err(_)) => {
                // Guest dropped the signal without sending an outcome.
                handles.frame.detach();
                return Err(Error::navigation_failed(
                    &location,
                    "navigation failed for unknown reason",
                ));
            }
            Err(_) => {
                warn!(
                    location = %location,
                    timeout_ms = options.navigation_timeout_ms,
                    "Navigation timed out"
                );
                handles.frame.detach();
                return Err(Error::navigation_timeout(
                    &location,
                    options.navigation_timeout_ms,
                ));
            }
        }

        if handles.request_tx.is_closed() {
            handles.frame.detach();
            return Err(Error::site_load(&location));
        }

        let client = RpcClient::new(channel, handles.request_tx, handles.reply_rx);
        info!(location = %location, "Page ready");

        Ok(Page::connect(handles.frame, client))
    }
}
