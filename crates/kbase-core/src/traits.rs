/// The fixed, pre-trained mapping from text to a constant-dimension vector.
/// The vector index depends only on this seam; the concrete backend lives in
/// `kbase-embed`.
pub trait Embedder: Send + Sync {
    /// Output dimension, constant for the lifetime of the embedder.
    fn dim(&self) -> usize;
    /// Maximum token window; longer inputs are truncated.
    fn max_len(&self) -> usize;
    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
