use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use kbase_core::traits::Embedder;
use kbase_core::types::{CollectionInfo, FileType, Record, RecordMeta};
use kbase_embed::get_default_embedder;

use crate::schema::{build_arrow_schema, EMBEDDING_DIM};

/// Handle over one LanceDB collection plus the embedder that feeds it.
/// All reads and writes go through an explicit instance; there is no
/// process-global store.
pub struct DocumentStore {
    db: Connection,
    collection: String,
    embedder: Box<dyn Embedder>,
    model_name: String,
}

impl DocumentStore {
    /// Connect to (or create) the database at `db_path` and make sure the
    /// collection exists, empty if new.
    pub async fn open(db_path: &Path, collection: &str, model_name: &str) -> Result<Self> {
        let embedder = get_default_embedder()?;
        if embedder.dim() != EMBEDDING_DIM as usize {
            return Err(anyhow!(
                "Embedder dimension {} does not match the collection schema ({})",
                embedder.dim(),
                EMBEDDING_DIM
            ));
        }
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        let store = Self {
            db,
            collection: collection.to_string(),
            embedder,
            model_name: model_name.to_string(),
        };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let names = self.db.table_names().execute().await?;
        if names.contains(&self.collection) {
            return Ok(());
        }
        let schema = build_arrow_schema();
        let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
        self.db
            .create_table(&self.collection, Box::new(iter))
            .execute()
            .await?;
        debug!(collection = %self.collection, "created empty collection");
        Ok(())
    }

    /// Embed and persist the given records, returning the generated row ids
    /// in input order. An empty slice is a no-op that touches no storage.
    pub async fn add(&self, records: &[Record]) -> Result<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let ids: Vec<String> = records.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let batch = records_to_batch(records, &embeddings, &ids)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        let table = self.db.open_table(&self.collection).execute().await?;
        table.add(reader).execute().await?;
        info!(count = records.len(), collection = %self.collection, "records added");
        Ok(ids)
    }

    /// Nearest-neighbour search returning records with their raw L2
    /// distances, ascending. Lower is closer.
    pub async fn search_with_scores(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Record, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .remove(0);
        let table = self.db.open_table(&self.collection).execute().await?;
        let mut stream = table.vector_search(query_vec)?.limit(k).execute().await?;

        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for i in 0..batch.num_rows() {
                hits.push(row_to_hit(&batch, i)?);
            }
        }
        Ok(hits)
    }

    /// [`Self::search_with_scores`] without the distances.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Record>> {
        Ok(self
            .search_with_scores(query, k)
            .await?
            .into_iter()
            .map(|(record, _)| record)
            .collect())
    }

    /// Fixed-k retrieval surface over this store.
    pub fn retriever(&self, k: usize) -> Retriever<'_> {
        Retriever { store: self, k }
    }

    /// Drop the collection and recreate it empty. The store handle stays
    /// valid afterwards.
    pub async fn reset(&self) -> Result<()> {
        let names = self.db.table_names().execute().await?;
        if names.contains(&self.collection) {
            self.db.drop_table(&self.collection).await?;
        }
        self.ensure_collection().await?;
        info!(collection = %self.collection, "collection reset");
        Ok(())
    }

    /// Row count and identity of the collection.
    pub async fn info(&self) -> Result<CollectionInfo> {
        let table = self.db.open_table(&self.collection).execute().await?;
        let count = table.count_rows(None).await?;
        Ok(CollectionInfo {
            collection_name: self.collection.clone(),
            document_count: count,
            embedding_model: self.model_name.clone(),
        })
    }

}

/// Borrowed view that always searches with the same `k`.
pub struct Retriever<'a> {
    store: &'a DocumentStore,
    k: usize,
}

impl Retriever<'_> {
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Record>> {
        self.store.search(query, self.k).await
    }
}

fn records_to_batch(
    records: &[Record],
    embeddings: &[Vec<f32>],
    ids: &[String],
) -> Result<RecordBatch> {
    let schema = build_arrow_schema();
    let mut contents = Vec::with_capacity(records.len());
    let mut sources = Vec::with_capacity(records.len());
    let mut file_types = Vec::with_capacity(records.len());
    let mut file_paths = Vec::with_capacity(records.len());
    let mut slide_numbers: Vec<Option<i32>> = Vec::with_capacity(records.len());
    let mut page_numbers: Vec<Option<i32>> = Vec::with_capacity(records.len());
    let mut chunk_indices: Vec<Option<i32>> = Vec::with_capacity(records.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());

    for (record, embedding) in records.iter().zip(embeddings.iter()) {
        let m = &record.metadata;
        contents.push(record.content.clone());
        sources.push(m.source.clone());
        file_types.push(m.file_type.as_str().to_string());
        file_paths.push(m.file_path.clone());
        slide_numbers.push(m.slide_number.map(|n| n as i32));
        page_numbers.push(m.page_number.map(|n| n as i32));
        chunk_indices.push(m.chunk_index.map(|n| n as i32));
        vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
    }

    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids.to_vec())),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(file_types)),
            Arc::new(StringArray::from(file_paths)),
            Arc::new(Int32Array::from(slide_numbers)),
            Arc::new(Int32Array::from(page_numbers)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), EMBEDDING_DIM)),
        ],
    )?)
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("column {name} missing or not Utf8"))
}

fn opt_int_col(batch: &RecordBatch, name: &str, row: usize) -> Result<Option<u32>> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow!("column {name} missing or not Int32"))?;
    if col.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(col.value(row) as u32))
    }
}

fn row_to_hit(batch: &RecordBatch, row: usize) -> Result<(Record, f32)> {
    let content = string_col(batch, "content")?.value(row).to_string();
    let source = string_col(batch, "source")?.value(row).to_string();
    let file_type_str = string_col(batch, "file_type")?.value(row).to_string();
    let file_type = FileType::from_extension(&file_type_str)
        .ok_or_else(|| anyhow!("unknown stored file_type: {file_type_str}"))?;
    let file_path = string_col(batch, "file_path")?.value(row).to_string();

    let metadata = RecordMeta {
        source,
        file_type,
        file_path,
        slide_number: opt_int_col(batch, "slide_number", row)?,
        page_number: opt_int_col(batch, "page_number", row)?,
        chunk_index: opt_int_col(batch, "chunk_index", row)?,
    };

    let distance = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .map(|c| c.value(row))
        .ok_or_else(|| anyhow!("search result missing _distance column"))?;

    Ok((Record::new(content, metadata), distance))
}
