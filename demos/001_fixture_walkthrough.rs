//! Fixture page walkthrough.
//!
//! Demonstrates:
//! - Building a page against a static fixture site
//! - Existence checks and attribute round trips
//! - Registered script evaluation
//! - Destroy semantics
//!
//! Usage:
//!   cargo run --example 001_fixture_walkthrough
//!   cargo run --example 001_fixture_walkthrough -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use common::{Args, FIXTURE_HTML};
use page_remote::{Page, PageOptions, ScriptRegistry, StaticSiteLoader};
use serde_json::Value;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== 001: Fixture Walkthrough ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating page against the fixture site...");

    let loader = Arc::new(StaticSiteLoader::new().with_site("fixture.html", FIXTURE_HTML));

    let mut scripts = ScriptRegistry::new();
    let sum = scripts.register("sum", |_| Ok(Value::from(1 + 2 + 3)));

    let mut page = Page::builder()
        .location("fixture.html")
        .options(PageOptions::new(320, 560, 10_000))
        .loader(loader)
        .scripts(scripts)
        .create()
        .await?;

    println!(
        "        ✓ Page ready (location={}, viewport={}x{})\n",
        page.location(),
        page.viewport().width,
        page.viewport().height
    );

    // ========================================================================
    // Existence checks
    // ========================================================================

    println!("[1] check_existence");

    let bodies = page.check_existence("body").await?;
    println!("    body: {bodies} match(es)");
    assert_eq!(bodies, 1, "fixture has exactly one body");

    let divs = page.check_existence(".a-class").await?;
    println!("    .a-class: {divs} match(es)");
    assert_eq!(divs, 2, "fixture has two .a-class divs");
    println!();

    // ========================================================================
    // Attribute round trip
    // ========================================================================

    println!("[2] set_attribute / get_attribute");

    let touched = page.set_attribute(".a-class", "data-state", "ready").await?;
    println!("    set data-state on {touched} element(s)");

    let value = page.get_attribute(".a-class", "data-state").await?;
    println!("    read back: {value:?}");
    assert_eq!(value.as_deref(), Some("ready"));
    println!();

    // ========================================================================
    // Attribute removal
    // ========================================================================

    println!("[3] remove_attribute");

    let removed = page.remove_attribute(".a-class", "data-state").await?;
    println!("    removed from {removed} element(s)");

    // Short budget: the attribute is gone and will not reappear.
    let gone = page
        .get_attribute_timeout("[data-state]", "data-state", Duration::from_millis(200))
        .await?;
    println!("    [data-state] lookup after removal: {gone:?}");
    println!();

    // ========================================================================
    // Script evaluation
    // ========================================================================

    println!("[4] eval");

    let result = page.eval(&sum).await?;
    println!("    sum script returned: {result}");
    assert_eq!(result, Value::from(6));
    println!();

    // ========================================================================
    // Done
    // ========================================================================

    println!("[Cleanup] Destroying page...");
    page.destroy();

    match page.check_existence("body").await {
        Ok(_) => println!("          ✗ Should have failed!"),
        Err(e) => println!("          ✓ Post-destroy call correctly failed: {e}"),
    }

    println!("\n=== Walkthrough complete ===\n");

    Ok(())
}
