//! Page lifecycle: options, creation and the host-side handle.
//!
//! Creation is a strict sequence: validate the options, attach the frame,
//! race the guest's load signal against the navigation timeout, then connect
//! the RPC client. Nothing is attached when validation fails, and a lost
//! race tears the frame back down before the error is returned.

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod options;
mod proxy;

pub use builder::PageBuilder;
pub use options::PageOptions;
pub use proxy::Page;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;
use crate::frame::SiteLoader;

// ============================================================================
// Creation
// ============================================================================

/// Creates a page in one call, with an empty script registry and a
/// generated channel tag.
///
/// Equivalent to `Page::builder().location(..).options(..).loader(..)` for
/// the common case; use [`PageBuilder`] directly to install scripts or pin
/// the channel.
///
/// # Errors
///
/// See [`PageBuilder::create`].
pub async fn create_page(
    location: impl Into<String>,
    options: PageOptions,
    loader: Arc<dyn SiteLoader>,
) -> Result<Page> {
    Page::builder()
        .location(location)
        .options(options)
        .loader(loader)
        .create()
        .await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::time::sleep;

    use crate::dom::Document;
    use crate::error::Error;
    use crate::frame::{StaticSiteLoader, Viewport};
    use crate::scripts::ScriptRegistry;

    const GUEST_HTML: &str = concat!(
        "<html><body>",
        r#"<div class="a-class" data-x="1"></div>"#,
        r#"<div class="a-class"></div>"#,
        "</body></html>",
    );

    const OPTIONS: PageOptions = PageOptions::new(320, 560, 10_000);

    fn fixture_loader() -> Arc<dyn SiteLoader> {
        Arc::new(StaticSiteLoader::new().with_site("guest.html", GUEST_HTML))
    }

    async fn fixture_page(scripts: ScriptRegistry) -> Page {
        Page::builder()
            .location("guest.html")
            .options(OPTIONS)
            .loader(fixture_loader())
            .scripts(scripts)
            .create()
            .await
            .expect("page created")
    }

    /// Loader whose navigation never completes.
    struct PendingSiteLoader;

    #[async_trait]
    impl SiteLoader for PendingSiteLoader {
        async fn load(&self, _location: &str) -> crate::error::Result<String> {
            std::future::pending().await
        }
    }

    /// Loader that dies mid-load, so the guest never reports an outcome.
    struct CrashingLoader;

    #[async_trait]
    impl SiteLoader for CrashingLoader {
        async fn load(&self, _location: &str) -> crate::error::Result<String> {
            panic!("loader crashed");
        }
    }

    /// Loader counting how often it was consulted.
    struct CountingLoader(AtomicUsize);

    #[async_trait]
    impl SiteLoader for CountingLoader {
        async fn load(&self, _location: &str) -> crate::error::Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(GUEST_HTML.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_exposes_location_and_viewport() {
        let page = fixture_page(ScriptRegistry::new()).await;

        assert_eq!(page.location(), "guest.html");
        assert_eq!(
            page.viewport(),
            Viewport {
                width: 320,
                height: 560
            }
        );
        assert!(!page.is_destroyed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_existence_counts_matches() {
        let page = fixture_page(ScriptRegistry::new()).await;

        assert_eq!(page.check_existence("body").await.expect("count"), 1);
        assert_eq!(page.check_existence(".a-class").await.expect("count"), 2);
        assert_eq!(
            page.check_existence_timeout("#missing", Duration::ZERO)
                .await
                .expect("count"),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_selector_is_an_error() {
        let page = fixture_page(ScriptRegistry::new()).await;

        let err = page.check_existence("div[").await.unwrap_err();
        assert!(err.to_string().contains("div["));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_and_get_attribute_round_trip() {
        let page = fixture_page(ScriptRegistry::new()).await;

        let touched = page
            .set_attribute(".a-class", "data-state", "ready")
            .await
            .expect("set");
        assert_eq!(touched, 2);

        let value = page
            .get_attribute(".a-class", "data-state")
            .await
            .expect("get");
        assert_eq!(value.as_deref(), Some("ready"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_absent_attribute_is_none() {
        let page = fixture_page(ScriptRegistry::new()).await;

        let value = page
            .get_attribute_timeout("body", "data-nothing", Duration::ZERO)
            .await
            .expect("get");
        assert_eq!(value, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_attribute_counts_matches() {
        let page = fixture_page(ScriptRegistry::new()).await;

        let touched = page
            .remove_attribute(".a-class", "class")
            .await
            .expect("remove");
        assert_eq!(touched, 2);

        let remaining = page
            .check_existence_timeout(".a-class", Duration::ZERO)
            .await
            .expect("count");
        assert_eq!(remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eval_runs_registered_script() {
        let mut scripts = ScriptRegistry::new();
        let sum = scripts.register("sum", |_| Ok(Value::from(1 + 2 + 3)));

        let page = fixture_page(scripts).await;
        assert_eq!(page.eval(&sum).await.expect("script ran"), Value::from(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eval_mutation_is_observable() {
        let mut scripts = ScriptRegistry::new();
        let mark = scripts.register("mark", |document| {
            let body = Document::parse_selector("body")?;
            Ok(Value::from(document.set_attribute(&body, "data-marked", "1")))
        });

        let page = fixture_page(scripts).await;
        assert_eq!(page.eval(&mark).await.expect("script ran"), Value::from(1u64));

        let value = page
            .get_attribute("body", "data-marked")
            .await
            .expect("get");
        assert_eq!(value.as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eval_unregistered_key_fails() {
        // A key minted by a registry that was never installed on this page.
        let mut other = ScriptRegistry::new();
        let foreign = other.register("elsewhere", |_| Ok(Value::Null));

        let page = fixture_page(ScriptRegistry::new()).await;
        let err = page.eval(&foreign).await.unwrap_err();
        assert!(err.to_string().contains("elsewhere"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_fails_later_operations() {
        let mut page = fixture_page(ScriptRegistry::new()).await;

        page.destroy();
        assert!(page.is_destroyed());

        let err = page.check_existence("body").await.unwrap_err();
        assert!(matches!(err, Error::PageDestroyed));

        // Destroying again is a no-op.
        page.destroy();
        assert!(page.is_destroyed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_options_rejected_before_loading() {
        let loader = Arc::new(CountingLoader(AtomicUsize::new(0)));

        for options in [
            PageOptions::new(0, 560, 10_000),
            PageOptions::new(320, 0, 10_000),
            PageOptions::new(320, 560, 0),
        ] {
            let countable: Arc<dyn SiteLoader> = loader.clone();
            let err = create_page("guest.html", options, countable)
                .await
                .unwrap_err();
            assert!(err.is_config_error());
        }

        assert_eq!(loader.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_location_is_config_error() {
        let err = Page::builder()
            .options(OPTIONS)
            .loader(fixture_loader())
            .create()
            .await
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_failure_surfaces() {
        let err = create_page("guest.html", OPTIONS, Arc::new(StaticSiteLoader::new()))
            .await
            .unwrap_err();
        assert!(err.is_navigation_error());
        assert!(!err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_load_signal_is_navigation_failure() {
        // The guest task aborts before sending any outcome; the dropped
        // signal must surface as a failure, not hang until the timeout.
        let err = create_page("guest.html", OPTIONS, Arc::new(CrashingLoader))
            .await
            .unwrap_err();

        assert!(err.is_navigation_error());
        assert!(!err.is_timeout());
        assert!(
            err.to_string()
                .contains("navigation failed for unknown reason")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_timeout_loses_the_race() {
        let err = create_page("slow.html", OPTIONS, Arc::new(PendingSiteLoader))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "The navigation to slow.html timed out after 10000 milliseconds"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_observes_concurrent_mutation() {
        let page = fixture_page(ScriptRegistry::new()).await;

        // The selector matches nothing until the second future flips the
        // attribute 300ms into the poll window.
        let (found, flipped) = tokio::join!(
            page.check_existence_timeout("[data-flag]", Duration::from_secs(5)),
            async {
                sleep(Duration::from_millis(300)).await;
                page.set_attribute_timeout("body", "data-flag", "on", Duration::ZERO)
                    .await
            },
        );

        assert_eq!(flipped.expect("set"), 1);
        assert_eq!(found.expect("count"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_are_isolated() {
        let first = fixture_page(ScriptRegistry::new()).await;
        let second = fixture_page(ScriptRegistry::new()).await;

        first
            .set_attribute_timeout("body", "data-owner", "first", Duration::ZERO)
            .await
            .expect("set");

        let other = second
            .get_attribute_timeout("body", "data-owner", Duration::ZERO)
            .await
            .expect("get");
        assert_eq!(other, None);

        let own = first
            .get_attribute_timeout("body", "data-owner", Duration::ZERO)
            .await
            .expect("get");
        assert_eq!(own.as_deref(), Some("first"));
    }
}
