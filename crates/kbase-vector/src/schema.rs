use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const EMBEDDING_DIM: i32 = 384;

/// One row per stored chunk. Slide, page and chunk positions are nullable
/// because each applies only to some source formats.
pub fn build_arrow_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("file_type", DataType::Utf8, false),
        Field::new("file_path", DataType::Utf8, false),
        Field::new("slide_number", DataType::Int32, true),
        Field::new("page_number", DataType::Int32, true),
        Field::new("chunk_index", DataType::Int32, true),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            true,
        ),
    ]))
}
