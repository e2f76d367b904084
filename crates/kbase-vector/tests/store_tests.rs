use std::path::Path;

use kbase_core::types::{FileType, Record, RecordMeta};
use kbase_vector::DocumentStore;
use tempfile::TempDir;

fn meta(source: &str) -> RecordMeta {
    RecordMeta::for_file(Path::new(source), FileType::Txt)
}

fn record(content: &str, source: &str) -> Record {
    Record::new(content, meta(source))
}

async fn open_store(dir: &TempDir) -> DocumentStore {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    DocumentStore::open(dir.path(), "knowledge_base", "all-MiniLM-L6-v2")
        .await
        .unwrap()
}

#[tokio::test]
async fn empty_add_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let ids = store.add(&[]).await.unwrap();
    assert!(ids.is_empty());
    assert_eq!(store.info().await.unwrap().document_count, 0);
}

#[tokio::test]
async fn add_returns_one_id_per_record_and_counts_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let records = vec![
        record("chickens need a draft-free coop", "coop.txt"),
        record("rotate pasture every three weeks", "pasture.txt"),
        record("store seed potatoes in a dark cellar", "potatoes.txt"),
    ];
    let ids = store.add(&records).await.unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(
        ids.iter().collect::<std::collections::HashSet<_>>().len(),
        3,
        "ids must be unique"
    );
    let info = store.info().await.unwrap();
    assert_eq!(info.document_count, 3);
    assert_eq!(info.collection_name, "knowledge_base");
    assert_eq!(info.embedding_model, "all-MiniLM-L6-v2");
}

#[tokio::test]
async fn zero_k_search_returns_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .add(&[record("hand tools beat power tools off grid", "tools.txt")])
        .await
        .unwrap();
    let hits = store.search("tools", 0).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn exact_text_is_the_closest_hit() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .add(&[
            record("canning tomatoes requires a pressure cooker", "canning.txt"),
            record("firewood should season for a full year", "firewood.txt"),
            record("a root cellar holds near forty degrees", "cellar.txt"),
        ])
        .await
        .unwrap();

    let hits = store
        .search_with_scores("firewood should season for a full year", 3)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].0.content, "firewood should season for a full year");
    assert_eq!(hits[0].0.metadata.source, "firewood.txt");
    assert_eq!(hits[0].0.metadata.file_type, FileType::Txt);
    assert!(hits[0].1 < 1e-3, "identical text should be at distance ~0");
}

#[tokio::test]
async fn scores_are_ascending_distances() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let records: Vec<Record> = (0..5)
        .map(|i| record(&format!("entry about topic number {i}"), "notes.txt"))
        .collect();
    store.add(&records).await.unwrap();

    let hits = store
        .search_with_scores("entry about topic number 2", 5)
        .await
        .unwrap();
    assert_eq!(hits.len(), 5);
    for pair in hits.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "distances must be ascending");
    }
}

#[tokio::test]
async fn optional_positions_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let mut m = RecordMeta::for_file(Path::new("deck.pptx"), FileType::Pptx);
    m.slide_number = Some(4);
    m.chunk_index = Some(0);
    store
        .add(&[Record::new("Slide 4:\nwater table depth by season", m)])
        .await
        .unwrap();

    let hits = store.search("water table depth", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.slide_number, Some(4));
    assert_eq!(hits[0].metadata.page_number, None);
    assert_eq!(hits[0].metadata.chunk_index, Some(0));
}

#[tokio::test]
async fn reset_empties_but_keeps_the_collection_usable() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .add(&[record("greywater reuse rules of thumb", "water.txt")])
        .await
        .unwrap();
    assert_eq!(store.info().await.unwrap().document_count, 1);

    store.reset().await.unwrap();
    assert_eq!(store.info().await.unwrap().document_count, 0);

    store
        .add(&[record("compost needs carbon and nitrogen", "compost.txt")])
        .await
        .unwrap();
    assert_eq!(store.info().await.unwrap().document_count, 1);
}

#[tokio::test]
async fn reset_on_a_fresh_store_succeeds() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.reset().await.unwrap();
    assert_eq!(store.info().await.unwrap().document_count, 0);
}

#[tokio::test]
async fn data_survives_reopening() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir).await;
        store
            .add(&[record("smoke fish at one hundred eighty degrees", "fish.txt")])
            .await
            .unwrap();
    }
    let store = open_store(&dir).await;
    assert_eq!(store.info().await.unwrap().document_count, 1);
    let hits = store.retriever(1).retrieve("smoke fish").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.source, "fish.txt");
}
