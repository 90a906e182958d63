use crate::embeddings::{validate_batch, Embedder};
use crate::error::EmbeddingError;
use crate::explain::explain_match;
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::index::FlatL2Index;
use crate::info::InfoExtractor;
use crate::ingest::{ingest_folder_best_effort, SkippedPdf};
use crate::scoring::rank_and_filter;
use crate::traits::VectorIndex;
use crate::{Candidate, IngestError, MatchResult, SearchError};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Corpus<I = FlatL2Index> {
    candidates: Vec<Candidate>,
    embeddings: Vec<Vec<f32>>,
    index: I,
    built_at: Option<DateTime<Utc>>,
}

impl<I> Corpus<I>
where
    I: VectorIndex + Default,
{
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            embeddings: Vec::new(),
            index: I::default(),
            built_at: None,
        }
    }

    fn assemble(candidates: Vec<Candidate>, embeddings: Vec<Vec<f32>>) -> Result<Self, IngestError> {
        if candidates.len() != embeddings.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: candidates.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        let mut index = I::default();
        index.build(&embeddings)?;

        Ok(Self {
            candidates,
            embeddings,
            index,
            built_at: Some(Utc::now()),
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }
}

#[derive(Debug, Clone)]
pub struct CorpusStatus {
    pub candidate_count: usize,
    pub model_name: String,
    pub built_at: Option<DateTime<Utc>>,
}

pub struct IndexOutcome {
    pub candidate_count: usize,
    pub skipped_files: Vec<SkippedPdf>,
}

pub struct CorpusManager<E, X = LopdfExtractor, I = FlatL2Index> {
    embedder: E,
    extractor: X,
    info: InfoExtractor,
    current: RwLock<Arc<Corpus<I>>>,
    rebuild: Mutex<()>,
}

impl<E> CorpusManager<E>
where
    E: Embedder,
{
    pub fn new(embedder: E) -> Result<Self, IngestError> {
        Self::with_extractor(embedder, LopdfExtractor)
    }
}

impl<E, X, I> CorpusManager<E, X, I>
where
    E: Embedder,
    X: PdfExtractor,
    I: VectorIndex + Default,
{
    pub fn with_extractor(embedder: E, extractor: X) -> Result<Self, IngestError> {
        Ok(Self {
            embedder,
            extractor,
            info: InfoExtractor::new()?,
            current: RwLock::new(Arc::new(Corpus::empty())),
            rebuild: Mutex::new(()),
        })
    }

    pub fn index(&self, directory: &Path) -> Result<usize, IngestError> {
        Ok(self.index_with_report(directory)?.candidate_count)
    }

    pub fn index_with_report(&self, directory: &Path) -> Result<IndexOutcome, IngestError> {
        let _writer = self.rebuild.lock();

        let report = ingest_folder_best_effort(directory, &self.extractor, &self.info)?;
        for skipped in &report.skipped_files {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped resume");
        }

        let texts = report
            .candidates
            .iter()
            .map(|candidate| candidate.full_text.clone())
            .collect::<Vec<_>>();

        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            let vectors = self.embedder.encode(&texts)?;
            validate_batch(&vectors, texts.len(), self.embedder.dimensions())?;
            vectors
        };

        let corpus = Corpus::assemble(report.candidates, embeddings)?;
        let candidate_count = corpus.len();
        *self.current.write() = Arc::new(corpus);

        info!(
            directory = %directory.display(),
            candidate_count,
            skipped = report.skipped_files.len(),
            model = self.embedder.model_name(),
            "published resume corpus"
        );

        Ok(IndexOutcome {
            candidate_count,
            skipped_files: report.skipped_files,
        })
    }

    pub fn snapshot(&self) -> Arc<Corpus<I>> {
        Arc::clone(&self.current.read())
    }

    pub fn corpus_size(&self) -> usize {
        self.current.read().len()
    }

    pub fn status(&self) -> CorpusStatus {
        let corpus = self.snapshot();
        CorpusStatus {
            candidate_count: corpus.len(),
            model_name: self.embedder.model_name().to_string(),
            built_at: corpus.built_at(),
        }
    }

    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<MatchResult>, SearchError> {
        let corpus = self.snapshot();
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.encode(&[query.to_string()])?;
        validate_batch(&vectors, 1, self.embedder.dimensions())?;
        let query_vector = vectors.swap_remove(0);

        let k = top_k.min(corpus.len());
        let neighbors = corpus.index().query(&query_vector, k)?;
        debug!(k, neighbors = neighbors.len(), "vector neighbors retrieved");

        let results = rank_and_filter(neighbors)
            .into_iter()
            .filter_map(|scored| {
                corpus.candidates().get(scored.position).map(|candidate| {
                    MatchResult::new(candidate, scored.score, explain_match(query, candidate))
                })
            })
            .collect::<Vec<_>>();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PageText;
    use crate::scoring::SCORE_THRESHOLD;
    use crate::CharacterNgramEmbedder;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    struct PlainTextExtractor;

    impl PdfExtractor for PlainTextExtractor {
        fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
            if path.to_string_lossy().contains("broken") {
                return Err(IngestError::PdfParse("unexpected end of file".to_string()));
            }
            Ok(vec![PageText {
                text: fs::read_to_string(path)?,
            }])
        }
    }

    /// One axis per keyword so distances are easy to reason about.
    struct KeywordEmbedder {
        keywords: Vec<&'static str>,
        weight: f32,
        fail: AtomicBool,
    }

    impl KeywordEmbedder {
        fn new(keywords: &[&'static str]) -> Self {
            Self {
                keywords: keywords.to_vec(),
                weight: 1.0,
                fail: AtomicBool::new(false),
            }
        }

        fn with_weight(mut self, weight: f32) -> Self {
            self.weight = weight;
            self
        }
    }

    impl Embedder for KeywordEmbedder {
        fn dimensions(&self) -> usize {
            self.keywords.len()
        }

        fn model_name(&self) -> &str {
            "keyword-axes"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmbeddingError::Backend {
                    backend: "keyword-axes".to_string(),
                    details: "model unavailable".to_string(),
                });
            }
            Ok(texts
                .iter()
                .map(|text| {
                    let lowered = text.to_lowercase();
                    self.keywords
                        .iter()
                        .map(|keyword| if lowered.contains(keyword) { self.weight } else { 0.0 })
                        .collect()
                })
                .collect())
        }
    }

    fn manager(keywords: &[&'static str]) -> CorpusManager<KeywordEmbedder, PlainTextExtractor> {
        CorpusManager::with_extractor(KeywordEmbedder::new(keywords), PlainTextExtractor)
            .expect("manager builds")
    }

    #[test]
    fn failed_document_is_skipped_and_absent_from_results() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("alice.pdf"), "Alice\nReact developer, 6 years of experience")?;
        fs::write(dir.path().join("bob.pdf"), "Bob\nReact engineer\nreact native")?;
        fs::write(dir.path().join("broken.pdf"), "React React React")?;

        let manager = manager(&["react"]);
        let outcome = manager.index_with_report(dir.path())?;

        assert_eq!(outcome.candidate_count, 2);
        assert_eq!(outcome.skipped_files.len(), 1);
        assert_eq!(manager.corpus_size(), 2);

        let results = manager.search("react", 5)?;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|result| result.id != "broken"));
        Ok(())
    }

    #[test]
    fn explanation_lists_query_skills_and_experience() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("casey.pdf"),
            "Casey Jones\nFrontend work with React and Node.js\n6 years of experience",
        )?;
        fs::write(dir.path().join("dana.pdf"), "Dana Park\nJava and SQL")?;

        let manager = manager(&["react", "java"]);
        manager.index(dir.path())?;

        let results = manager.search("react frontend engineer", 5)?;
        assert_eq!(results.len(), 1);

        let top = &results[0];
        assert_eq!(top.id, "casey");
        assert_eq!(top.name, "Casey Jones");
        assert_eq!(top.skills, vec!["react", "node.js"]);
        assert_eq!(top.score, 1.0);
        assert!(top.explanation.starts_with("Has relevant skills: react"));
        assert!(top.explanation.contains("6 years of experience"));
        Ok(())
    }

    #[test]
    fn results_are_ranked_and_above_threshold() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.pdf"), "A\nrust go python")?;
        fs::write(dir.path().join("b.pdf"), "B\nrust go")?;
        fs::write(dir.path().join("c.pdf"), "C\nrust")?;
        fs::write(dir.path().join("d.pdf"), "D\ncobol")?;

        let half_weight: CorpusManager<_, _> = CorpusManager::with_extractor(
            KeywordEmbedder::new(&["rust", "go", "python"]).with_weight(0.5),
            PlainTextExtractor,
        )?;
        half_weight.index(dir.path())?;

        let results = half_weight.search("rust go python", 10)?;
        let ids = results.iter().map(|result| result.id.as_str()).collect::<Vec<_>>();
        let scores = results.iter().map(|result| result.score).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(scores, vec![1.0, 0.8, 0.667, 0.571]);

        assert_eq!(half_weight.search("rust go python", 1)?.len(), 1);
        assert!(half_weight.search("rust go python", 0)?.is_empty());

        // At full weight b sits at squared distance 1, scoring exactly 0.5.
        let full_weight = manager(&["rust", "go", "python"]);
        full_weight.index(dir.path())?;

        let results = full_weight.search("rust go python", 10)?;
        let ids = results.iter().map(|result| result.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a"]);
        assert!(results.iter().all(|result| result.score > SCORE_THRESHOLD));
        Ok(())
    }

    #[test]
    fn empty_directory_publishes_empty_corpus() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.pdf"), "nothing useful")?;

        let manager = manager(&["react"]);
        assert_eq!(manager.index(dir.path())?, 0);
        assert_eq!(manager.corpus_size(), 0);
        assert!(manager.search("react", 5)?.is_empty());
        assert!(manager.status().built_at.is_some());
        Ok(())
    }

    #[test]
    fn search_before_indexing_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let manager = CorpusManager::new(CharacterNgramEmbedder::default())?;
        assert!(manager.search("python", 5)?.is_empty());

        let status = manager.status();
        assert_eq!(status.candidate_count, 0);
        assert_eq!(status.built_at, None);
        Ok(())
    }

    #[test]
    fn default_pipeline_skips_unparseable_pdfs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("unreadable.pdf"), b"%PDF-1.4\n%broken")?;

        let manager = CorpusManager::new(CharacterNgramEmbedder::default())?;
        let outcome = manager.index_with_report(dir.path())?;

        assert_eq!(outcome.candidate_count, 0);
        assert_eq!(outcome.skipped_files.len(), 1);
        Ok(())
    }

    #[test]
    fn reindexing_unchanged_directory_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("erin.pdf"), "Erin\nPython data science, 4 years experience")?;
        fs::write(dir.path().join("finn.pdf"), "Finn\nKotlin developer")?;

        let manager: CorpusManager<_, _> =
            CorpusManager::with_extractor(CharacterNgramEmbedder::default(), PlainTextExtractor)?;
        manager.index(dir.path())?;
        let first = manager.snapshot();
        manager.index(dir.path())?;
        let second = manager.snapshot();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.candidates(), second.candidates());
        assert_eq!(first.embeddings(), second.embeddings());
        Ok(())
    }

    #[test]
    fn failed_rebuild_keeps_previous_corpus() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("gail.pdf"), "Gail\nreact")?;

        let manager = manager(&["react"]);
        manager.index(dir.path())?;
        let before = manager.snapshot();

        fs::write(dir.path().join("hank.pdf"), "Hank\nreact")?;
        manager.embedder.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            manager.index(dir.path()),
            Err(IngestError::Embedding(_))
        ));
        assert!(Arc::ptr_eq(&before, &manager.snapshot()));
        assert_eq!(manager.corpus_size(), 1);

        assert!(manager.index(&dir.path().join("missing")).is_err());
        assert!(Arc::ptr_eq(&before, &manager.snapshot()));

        manager.embedder.fail.store(false, Ordering::SeqCst);
        assert_eq!(manager.index(dir.path())?, 2);
        Ok(())
    }

    struct NanEmbedder;

    impl Embedder for NanEmbedder {
        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "nan"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![f32::NAN, 0.0]).collect())
        }
    }

    #[test]
    fn non_finite_embeddings_abort_the_rebuild() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("ivy.pdf"), "Ivy\nreact")?;

        let manager: CorpusManager<_, _> = CorpusManager::with_extractor(NanEmbedder, PlainTextExtractor)?;
        assert!(matches!(
            manager.index(dir.path()),
            Err(IngestError::Embedding(EmbeddingError::NonFinite { row: 0, column: 0 }))
        ));
        assert_eq!(manager.corpus_size(), 0);
        Ok(())
    }

    #[test]
    fn readers_only_observe_whole_corpora() -> Result<(), Box<dyn std::error::Error>> {
        let small = tempdir()?;
        let large = tempdir()?;
        for name in ["a", "b"] {
            fs::write(small.path().join(format!("{name}.pdf")), format!("{name}\nreact"))?;
        }
        for name in ["c", "d", "e"] {
            fs::write(large.path().join(format!("{name}.pdf")), format!("{name}\njava react"))?;
        }

        let manager = manager(&["react", "java"]);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..20 {
                    let folder = if round % 2 == 0 { small.path() } else { large.path() };
                    manager.index(folder).expect("rebuild succeeds");
                }
            });

            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let corpus = manager.snapshot();
                        assert!([0, 2, 3].contains(&corpus.len()));
                        assert_eq!(corpus.embeddings().len(), corpus.len());
                        assert_eq!(corpus.index().len(), corpus.len());

                        let results = manager.search("react", 5).expect("search succeeds");
                        assert!(results.len() <= 3);
                    }
                });
            }
        });

        Ok(())
    }
}
