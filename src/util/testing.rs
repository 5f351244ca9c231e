//! Shared test helpers: logging setup and fixture data.

use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Cell, Record, Table};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "sunburst=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// `A/B=2, A/C=1, D=3`: two equal top-level sectors, A split 2:1.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::from_path(["A", "B"], Some(2.0)),
        Record::from_path(["A", "C"], Some(1.0)),
        Record::from_path(["D"], Some(3.0)),
    ]
}

/// [`sample_records`] as a `level-columns` table.
pub fn sample_table() -> Table {
    let text = |s: &str| Some(Cell::Text(s.to_string()));
    Table {
        columns: vec!["level1".into(), "level2".into(), "value".into()],
        rows: vec![
            vec![text("A"), text("B"), Some(Cell::Number(2.0))],
            vec![text("A"), text("C"), Some(Cell::Number(1.0))],
            vec![text("D"), None, Some(Cell::Number(3.0))],
        ],
    }
}
