pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod explain;
pub mod extractor;
pub mod index;
pub mod info;
pub mod ingest;
pub mod models;
pub mod scoring;
pub mod traits;

pub use corpus::{Corpus, CorpusManager, CorpusStatus, IndexOutcome};
#[cfg(feature = "fastembed")]
pub use embeddings::SentenceEmbedder;
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS, SENTENCE_MODEL_NAME,
};
pub use error::{EmbeddingError, IndexError, IngestError, SearchError};
pub use explain::explain_match;
pub use extractor::{extract_text, LopdfExtractor, PageText, PdfExtractor};
pub use index::FlatL2Index;
pub use info::{InfoExtractor, SKILL_VOCABULARY};
pub use ingest::{discover_pdf_files, ingest_folder_best_effort, IngestionReport, SkippedPdf};
pub use models::{Candidate, CandidateFields, MatchResult};
pub use scoring::{similarity_from_distance, DEFAULT_TOP_K, SCORE_THRESHOLD};
pub use traits::{Neighbor, VectorIndex};
