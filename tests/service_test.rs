//! Tests for SunburstService: table loading, chart building, refresh and zoom

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use sunburst::application::services::SunburstService;
use sunburst::application::ApplicationError;
use sunburst::config::Settings;
use sunburst::domain::{Cell, DomainError, PathKey, Record, Table, FULL_TURN};
use sunburst::infrastructure::di::ServiceContainer;
use sunburst::infrastructure::traits::FileSystem;
use sunburst::util::testing::{init_test_setup, sample_table};

const SAMPLE_JSON: &str = r#"{
  "columns": ["level1", "level2", "value"],
  "rows": [["A", "B", 2], ["A", "C", 1], ["D", null, 3]]
}"#;

/// In-memory filesystem that records every read
struct MockFileSystem {
    files: HashMap<PathBuf, String>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MockFileSystem {
    fn with_file(path: &str, content: &str) -> Self {
        Self {
            files: HashMap::from([(PathBuf::from(path), content.to_string())]),
            reads: Mutex::new(Vec::new()),
        }
    }

    fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

fn service(settings: Settings) -> SunburstService {
    ServiceContainer::new(settings).sunburst
}

#[test]
fn given_json_table_file_when_opening_then_chart_is_laid_out() {
    // Arrange
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, SAMPLE_JSON).unwrap();

    // Act
    let chart = service(Settings::default()).open(&path).expect("open");

    // Assert
    assert_eq!(chart.strategy, "level-columns");
    assert_eq!(chart.stats.contributed, 3);
    assert_eq!(chart.state.partition().tree().root_node().weight, 6.0);
    assert_eq!(chart.state.partition().config().radius, 300.0);
    assert!(chart.state.focus().is_root());
}

#[test]
fn given_mock_filesystem_when_opening_then_reads_through_trait() {
    // Arrange
    let fs = Arc::new(MockFileSystem::with_file("/data/t.json", SAMPLE_JSON));
    let container = ServiceContainer::with_deps(Settings::default(), fs.clone());

    // Act
    let chart = container
        .sunburst
        .open(Path::new("/data/t.json"))
        .expect("open");

    // Assert
    assert_eq!(fs.reads(), vec![PathBuf::from("/data/t.json")]);
    assert_eq!(chart.state.render_list().len(), 4);
}

#[test]
fn given_missing_file_when_opening_then_table_not_found_without_read() {
    let fs = Arc::new(MockFileSystem::with_file("/data/t.json", SAMPLE_JSON));
    let container = ServiceContainer::with_deps(Settings::default(), fs.clone());

    let err = container
        .sunburst
        .open(Path::new("/data/missing.json"))
        .unwrap_err();

    match err {
        ApplicationError::TableNotFound { path } => {
            assert_eq!(path, PathBuf::from("/data/missing.json"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(fs.reads().is_empty());
}

#[test]
fn given_directory_path_when_opening_then_table_not_found() {
    let dir = TempDir::new().unwrap();

    let err = service(Settings::default()).open(dir.path()).unwrap_err();

    assert!(matches!(err, ApplicationError::TableNotFound { .. }));
}

#[test]
fn given_invalid_json_when_opening_then_invalid_table_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = service(Settings::default()).open(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidTable { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn given_unusable_columns_when_building_chart_then_domain_error() {
    let table = Table {
        columns: vec!["value".into()],
        rows: vec![],
    };

    let err = service(Settings::default())
        .chart_from_table(&table)
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NoMatchingStrategy { .. })
    ));
}

#[test]
fn given_settings_when_building_chart_then_radius_and_labels_follow() {
    let settings = Settings {
        radius: 40.0,
        label_min_thickness: 25.0,
        ..Settings::default()
    };

    let chart = service(settings).chart_from_table(&sample_table()).expect("chart");

    // Two rings of 20 each, below the label threshold.
    let items = chart.state.render_list();
    assert_eq!(items.iter().map(|i| i.rect.radius_outer).fold(0.0, f64::max), 40.0);
    assert!(items.iter().all(|i| !i.label_visible));
}

#[test]
fn given_chart_when_zooming_then_frames_end_settled_on_focus() {
    // Arrange
    let settings = Settings {
        frames: 4,
        ..Settings::default()
    };
    let svc = service(settings);
    let mut chart = svc.chart_from_table(&sample_table()).expect("chart");

    // Act
    let (focused, frames) = svc.zoom(&mut chart, &PathKey::parse("A"));

    // Assert
    assert_eq!(focused, PathKey::parse("A"));
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0].progress, 0.0);
    assert_eq!(frames[4].progress, 1.0);
    assert!(!chart.state.is_transitioning());

    let last = &frames[4].items;
    let a = last.iter().find(|i| i.path == PathKey::parse("A")).unwrap();
    assert_eq!((a.rect.angle_start, a.rect.angle_end), (0.0, FULL_TURN));
    assert_eq!(last, &chart.state.render_list());
}

#[test]
fn given_zoomed_chart_when_refreshing_then_root_focused_with_new_data() {
    // Arrange
    let svc = service(Settings::default());
    let mut chart = svc.chart_from_table(&sample_table()).expect("chart");
    chart.state.focus_on(&PathKey::parse("A"));
    chart.state.advance(0.5);
    let replacement = Table {
        columns: vec!["path".into(), "value".into()],
        rows: vec![vec![
            Some(Cell::Text("X/Y".into())),
            Some(Cell::Number(9.0)),
        ]],
    };

    // Act
    svc.refresh(&mut chart, &replacement).expect("refresh");

    // Assert
    assert_eq!(chart.strategy, "delimited-path");
    assert!(!chart.state.is_transitioning());
    assert!(chart.state.focus().is_root());
    assert_eq!(chart.state.partition().tree().root_node().weight, 9.0);
    assert_eq!(
        chart.state.visible_labels(),
        vec![PathKey::parse("X"), PathKey::parse("X/Y")]
    );
}

#[test]
fn given_records_when_building_chart_then_skipped_rows_counted() {
    let records = vec![
        Record::from_path(["A", "B"], Some(2.0)),
        Record::new(vec![None, Some("X")], Some(5.0)),
    ];

    let chart = service(Settings::default())
        .chart_from_records(&records)
        .expect("chart");

    assert_eq!(chart.strategy, "records");
    assert_eq!(chart.stats.contributed, 1);
    assert_eq!(chart.stats.skipped, 1);
    assert_eq!(chart.state.partition().tree().root_node().weight, 2.0);
}
