//! End-to-end pipeline tests with in-memory collaborators

use actes_domain::{
    CollaboratorError, CollaboratorKind, ExtractedFields, ExtractionOracle, RecordStatus, Row,
    StoragePublisher, TabularStore, TextRecognizer,
};
use actes_pipeline::{Collaborators, PipelineConfig, PipelineDriver, PipelineError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Returns the image file name as the page text
#[derive(Default)]
struct FakeRecognizer {
    calls: AtomicUsize,
}

impl TextRecognizer for FakeRecognizer {
    fn recognize(&self, image_path: &Path) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default())
    }
}

/// Maps page text (the file name) to canned fields
#[derive(Default)]
struct FakeOracle {
    pages: HashMap<String, ExtractedFields>,
    calls: AtomicUsize,
}

impl FakeOracle {
    fn with_page(mut self, page: &str, fields: ExtractedFields) -> Self {
        self.pages.insert(page.to_string(), fields);
        self
    }
}

impl ExtractionOracle for FakeOracle {
    fn extract(&self, raw_text: &str) -> Result<ExtractedFields, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(raw_text)
            .cloned()
            .ok_or_else(|| CollaboratorError::oracle(format!("no answer for {}", raw_text)))
    }
}

#[derive(Default)]
struct FakePublisher {
    published: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl FakePublisher {
    fn calls(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl StoragePublisher for FakePublisher {
    fn publish(&self, _bytes: &[u8], display_name: &str) -> Result<String, CollaboratorError> {
        if self.failing.contains(display_name) {
            return Err(CollaboratorError::publisher("quota exceeded"));
        }
        let mut published = self.published.lock().unwrap();
        published.push(display_name.to_string());
        Ok(format!("ref-{}", published.len()))
    }
}

#[derive(Default)]
struct FakeStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    reads: Mutex<HashMap<String, usize>>,
    unreachable: bool,
}

impl FakeStore {
    fn with_rows(self, table: &str, rows: Vec<Row>) -> Self {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    fn reads(&self, table: &str) -> usize {
        self.reads.lock().unwrap().get(table).copied().unwrap_or(0)
    }
}

impl TabularStore for FakeStore {
    fn read_all(&self, table: &str) -> Result<Vec<Row>, CollaboratorError> {
        *self.reads.lock().unwrap().entry(table.to_string()).or_default() += 1;
        if self.unreachable {
            return Err(CollaboratorError::store("connection refused"));
        }
        Ok(self.rows(table))
    }

    fn append_row(&self, table: &str, row: Row) -> Result<(), CollaboratorError> {
        if self.unreachable {
            return Err(CollaboratorError::store("connection refused"));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    fn replace_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), CollaboratorError> {
        if self.unreachable {
            return Err(CollaboratorError::store("connection refused"));
        }
        self.tables.lock().unwrap().insert(table.to_string(), rows);
        Ok(())
    }
}

/// Shared buffer collecting formatted log lines
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Install a subscriber writing to a buffer for the current thread
fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

fn directory_row(declarant: &str, address: &str, phone: &str, email: &str) -> Row {
    Row::new()
        .with("Declarant", declarant)
        .with("Address", address)
        .with("Phone", phone)
        .with("Email", email)
}

fn fields(name: &str, declarant: &str, street: &str, city: &str) -> ExtractedFields {
    ExtractedFields {
        full_name: ExtractedFields::field(Some(name.to_string())),
        date_of_death: Some("03/04/2024".to_string()),
        declarant_name: ExtractedFields::field(Some(declarant.to_string())),
        city: ExtractedFields::field(Some(city.to_string())),
        street: ExtractedFields::field(Some(street.to_string())),
    }
}

struct Harness {
    _dir: TempDir,
    images: Vec<PathBuf>,
    recognizer: Arc<FakeRecognizer>,
    oracle: Arc<FakeOracle>,
    publisher: Arc<FakePublisher>,
    store: Arc<FakeStore>,
    driver: PipelineDriver,
}

impl Harness {
    fn new(pages: &[&str], oracle: FakeOracle, publisher: FakePublisher, store: FakeStore) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let images = pages
            .iter()
            .map(|page| {
                let path = dir.path().join(page);
                std::fs::write(&path, page.as_bytes()).unwrap();
                path
            })
            .collect();

        let recognizer = Arc::new(FakeRecognizer::default());
        let oracle = Arc::new(oracle);
        let publisher = Arc::new(publisher);
        let store = Arc::new(store);

        let collaborators = Collaborators {
            recognizer: recognizer.clone(),
            oracle: oracle.clone(),
            publisher: publisher.clone(),
            store: store.clone(),
        };
        let driver = PipelineDriver::new(collaborators, PipelineConfig::default()).unwrap();

        Self {
            _dir: dir,
            images,
            recognizer,
            oracle,
            publisher,
            store,
            driver,
        }
    }
}

fn reference_store() -> FakeStore {
    FakeStore::default().with_rows(
        "directory",
        vec![
            directory_row("Pompes Funèbres Martin", "1 avenue Foch Paris", "0101010101", ""),
            directory_row("Roc Eclerc", "12 rue Neuve Lyon", "0202020202", "roc@example.fr"),
        ],
    )
}

#[tokio::test]
async fn test_declarant_match_beats_street_match() {
    let oracle = FakeOracle::default().with_page(
        "page-1.png",
        fields("jean DUPONT", "PF Martin", "12 rue Neuve", "Lyon"),
    );
    let store = FakeStore::default().with_rows(
        "directory",
        vec![
            directory_row("Roc Eclerc", "12 rue Neuve Lyon", "0202020202", "roc@example.fr"),
            directory_row("PF Martin", "Paris", "0101010101", "martin@example.fr"),
        ],
    );
    let h = Harness::new(&["page-1.png"], oracle, FakePublisher::default(), store);

    let outcome = h.driver.run(&h.images).await.unwrap();

    let record = &outcome.records[0];
    assert_eq!(record.phone.as_deref(), Some("0101010101"));
    assert_eq!(record.email.as_deref(), Some("martin@example.fr"));
}

#[tokio::test]
async fn test_phone_only_hit_stops_the_chain() {
    let oracle = FakeOracle::default().with_page(
        "page-1.png",
        fields("jean DUPONT", "Pompes Funèbres Martin", "12 rue Neuve", "Lyon"),
    );
    let h = Harness::new(&["page-1.png"], oracle, FakePublisher::default(), reference_store());

    let outcome = h.driver.run(&h.images).await.unwrap();

    let record = &outcome.records[0];
    assert_eq!(record.phone.as_deref(), Some("0101010101"));
    assert_eq!(record.email, None);
}

#[tokio::test]
async fn test_street_then_city_fallback() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("jean DUPONT", "", "12, rue Neuve", ""))
        .with_page("page-2.png", fields("marie CURIE", "Inconnu", "", "PARIS"));
    let h = Harness::new(&["page-1.png", "page-2.png"], oracle, FakePublisher::default(), reference_store());

    let outcome = h.driver.run(&h.images).await.unwrap();

    assert_eq!(outcome.records[0].phone.as_deref(), Some("0202020202"));
    assert_eq!(outcome.records[0].email.as_deref(), Some("roc@example.fr"));
    assert_eq!(outcome.records[1].phone.as_deref(), Some("0101010101"));
}

#[tokio::test]
async fn test_no_match_leaves_contact_empty() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("jean DUPONT", "Inconnu", "rue Absente", "Brest"));
    let h = Harness::new(&["page-1.png"], oracle, FakePublisher::default(), reference_store());

    let outcome = h.driver.run(&h.images).await.unwrap();

    let record = &outcome.records[0];
    assert_eq!(record.phone, None);
    assert_eq!(record.email, None);
    assert_eq!(record.status, RecordStatus::Pending);
}

#[tokio::test]
async fn test_same_name_twice_publishes_once() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("jean DUPONT", "", "", ""))
        .with_page("page-2.png", fields("Jean Dupont", "", "", ""));
    let h = Harness::new(&["page-1.png", "page-2.png"], oracle, FakePublisher::default(), reference_store());

    let outcome = h.driver.run(&h.images).await.unwrap();

    assert_eq!(h.publisher.calls(), 1);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].image_reference, "ref-1");
    assert_eq!(outcome.records[1].image_reference, "ref-1");

    let ledger = h.store.rows("images");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].get("Name"), Some("Acte de décès - jean DUPONT.png"));
    assert_eq!(ledger[0].get("Link"), Some("ref-1"));
}

#[tokio::test]
async fn test_previously_published_image_is_reused() {
    let oracle = FakeOracle::default().with_page("page-1.png", fields("jean DUPONT", "", "", ""));
    let store = reference_store().with_rows(
        "images",
        vec![Row::new()
            .with("Name", "Acte de décès - jean DUPONT.png")
            .with("Link", "https://storage.example/abc")],
    );
    let h = Harness::new(&["page-1.png"], oracle, FakePublisher::default(), store);

    let outcome = h.driver.run(&h.images).await.unwrap();

    assert_eq!(h.publisher.calls(), 0);
    assert_eq!(outcome.records[0].image_reference, "https://storage.example/abc");
    assert_eq!(h.store.rows("images").len(), 1);
}

#[tokio::test]
async fn test_output_follows_page_order() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("un UN", "", "", ""))
        .with_page("page-2.png", fields("deux DEUX", "", "", ""))
        .with_page("page-3.png", fields("trois TROIS", "", "", ""))
        .with_page("page-10.png", fields("dix DIX", "", "", ""));
    let h = Harness::new(
        &["page-3.png", "page-10.png", "page-1.png", "page-2.png"],
        oracle,
        FakePublisher::default(),
        reference_store(),
    );

    let outcome = h.driver.run(&h.images).await.unwrap();

    let names: Vec<_> = outcome.records.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["un UN", "deux DEUX", "trois TROIS", "dix DIX"]);
    assert_eq!(
        *h.publisher.published.lock().unwrap(),
        vec![
            "Acte de décès - un UN.png",
            "Acte de décès - deux DEUX.png",
            "Acte de décès - trois TROIS.png",
            "Acte de décès - dix DIX.png",
        ]
    );
}

#[tokio::test]
async fn test_missing_name_skips_only_that_image() {
    let (logs, _guard) = capture_logs();
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("un UN", "", "", ""))
        .with_page("page-2.png", fields("  ", "PF Martin", "", ""))
        .with_page("page-3.png", fields("trois TROIS", "", "", ""));
    let h = Harness::new(
        &["page-1.png", "page-2.png", "page-3.png"],
        oracle,
        FakePublisher::default(),
        reference_store(),
    );

    let outcome = h.driver.run(&h.images).await.unwrap();

    assert_eq!(outcome.processed(), 2);
    assert_eq!(outcome.records[0].full_name, "un UN");
    assert_eq!(outcome.records[1].full_name, "trois TROIS");

    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].image.ends_with("page-2.png"));
    assert!(matches!(outcome.skipped[0].error, PipelineError::IncompleteExtraction));

    let logs = logs.contents();
    assert!(logs.contains("image skipped"));
    assert!(logs.contains("page-2.png"));
    assert!(!logs.contains("page-1.png"));
    assert_eq!(h.publisher.calls(), 2);
}

#[tokio::test]
async fn test_collaborator_failures_skip_the_image() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("un UN", "", "", ""))
        .with_page("page-3.png", fields("trois TROIS", "", "", ""));
    let publisher = FakePublisher {
        failing: HashSet::from(["Acte de décès - un UN.png".to_string()]),
        ..Default::default()
    };
    let h = Harness::new(
        &["page-1.png", "page-2.png", "page-3.png"],
        oracle,
        publisher,
        reference_store(),
    );

    let outcome = h.driver.run(&h.images).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].full_name, "trois TROIS");

    let kinds: Vec<_> = outcome
        .skipped
        .iter()
        .map(|s| match &s.error {
            PipelineError::CollaboratorUnavailable { collaborator, .. } => Some(*collaborator),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec![Some(CollaboratorKind::Publisher), Some(CollaboratorKind::Oracle)]);
}

#[tokio::test]
async fn test_unreachable_store_aborts_before_any_image() {
    let store = FakeStore {
        unreachable: true,
        ..Default::default()
    };
    let oracle = FakeOracle::default().with_page("page-1.png", fields("un UN", "", "", ""));
    let h = Harness::new(&["page-1.png", "page-2.png"], oracle, FakePublisher::default(), store);

    let result = h.driver.run(&h.images).await;

    assert!(matches!(result, Err(PipelineError::DirectoryUnavailable(_))));
    assert_eq!(h.recognizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.oracle.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.publisher.calls(), 0);
}

#[tokio::test]
async fn test_directory_is_read_once_per_run() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("un UN", "PF Martin", "", ""))
        .with_page("page-2.png", fields("deux DEUX", "PF Martin", "", ""))
        .with_page("page-3.png", fields("trois TROIS", "Roc Eclerc", "", ""));
    let h = Harness::new(
        &["page-1.png", "page-2.png", "page-3.png"],
        oracle,
        FakePublisher::default(),
        reference_store(),
    );

    let mut ctx = h.driver.prepare().await.unwrap();
    let outcome = h.driver.run_with(&mut ctx, &h.images).await;

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(h.store.reads("directory"), 1);
    assert!(ctx.directory().is_loaded());
    assert_eq!(ctx.resolver().memoized(), 2);
    assert_eq!(ctx.dedup().len(), 3);
}

#[tokio::test]
async fn test_export_writes_fixed_columns() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("jean DUPONT", "Pompes Funèbres Martin", "", ""));
    let h = Harness::new(&["page-1.png"], oracle, FakePublisher::default(), reference_store());

    let outcome = h.driver.run(&h.images).await.unwrap();
    assert_eq!(h.driver.export("mars", &outcome.records).await.unwrap(), 1);

    let rows = h.store.rows("records/mars");
    assert_eq!(rows.len(), 1);
    let columns: Vec<_> = rows[0].cells().map(|(column, _)| column).collect();
    assert_eq!(columns, actes_domain::OUTPUT_COLUMNS.to_vec());
    assert_eq!(rows[0].get("Name"), Some("jean DUPONT"));
    assert_eq!(rows[0].get("Phone"), Some("0101010101"));
    assert_eq!(rows[0].get("Email"), Some(""));
    assert_eq!(rows[0].get("Status"), Some("à envoyer"));
    assert_eq!(rows[0].get("Image"), Some("ref-1"));
}

#[tokio::test]
async fn test_forced_rerun_replaces_batch_export() {
    let oracle = FakeOracle::default()
        .with_page("page-1.png", fields("jean DUPONT", "Pompes Funèbres Martin", "", ""))
        .with_page("page-2.png", fields("marie MARTIN", "Roc Eclerc", "", ""));
    let h = Harness::new(
        &["page-1.png", "page-2.png"],
        oracle,
        FakePublisher::default(),
        reference_store(),
    );

    let first = h.driver.run(&h.images).await.unwrap();
    h.driver.export("mars", &first.records).await.unwrap();
    let second = h.driver.run(&h.images).await.unwrap();
    h.driver.export("mars", &second.records).await.unwrap();

    let rows = h.store.rows("records/mars");
    let names: Vec<_> = rows.iter().filter_map(|row| row.get("Name")).collect();
    assert_eq!(names, vec!["jean DUPONT", "marie MARTIN"]);

    h.driver.export("avril", &second.records[..1]).await.unwrap();
    assert_eq!(h.store.rows("records/mars").len(), 2);
    assert_eq!(h.store.rows("records/avril").len(), 1);
    assert!(h.store.rows("records").is_empty());
}
