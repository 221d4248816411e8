//! Cucumber acceptance tests for the needle comparator
//!
//! Run with: cargo test --test acceptance

use cucumber::{writer, World, WriterExt};
use needle_acceptance_tests::world::NeedleWorld;

#[tokio::main]
async fn main() {
    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    NeedleWorld::cucumber()
        .before(|_feature, _rule, scenario, _world| {
            Box::pin(async move {
                tracing::info!("Starting scenario: {}", scenario.name);
            })
        })
        .with_writer(
            writer::Basic::stdout()
                .summarized()
                .assert_normalized(),
        )
        .filter_run_and_exit("features/", |_, _, sc| {
            // Skip scenarios tagged with @skip
            !sc.tags.iter().any(|t| t == "skip")
        })
        .await;
}
