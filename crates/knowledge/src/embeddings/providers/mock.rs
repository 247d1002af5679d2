//! Deterministic trigram embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use lexguide_core::AppResult;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// English and Indonesian function words that carry no retrieval signal.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "is", "at", "which", "on", "an", "as", "are", "was", "were", "for", "to", "of",
        "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has",
        "had", "it", "its", "their", "they", "them", "what", "how", "does", "yang", "dan", "di",
        "ke", "dari", "untuk", "dengan", "atau", "ini", "itu",
    ]
    .into_iter()
    .collect()
});

/// Offline embedder for tests and development.
///
/// Hashes character trigrams and whole words of the non-stop-word tokens
/// into a fixed-width vector, then normalizes it. Equal texts give equal
/// vectors and texts sharing vocabulary score a positive cosine similarity.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let mut frequencies: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }

        for (token, count) in &frequencies {
            let weight = (*count as f32).sqrt();
            let chars: Vec<char> = token.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram, 37)] += weight;
            }
            vector[self.bucket(token, 31)] += *count as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn bucket(&self, key: &str, multiplier: u64) -> usize {
        let hash = key
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }
}

/// Lowercased alphanumeric tokens longer than two characters, minus stop words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_unit_length() {
        let provider = MockProvider::new(384);
        let embedding = provider.embed("Right to erasure under Article 17").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic_and_punctuation_insensitive() {
        let provider = MockProvider::new(384);
        let a = provider.embed("consent withdrawal").await.unwrap();
        let b = provider.embed("Consent, withdrawal!").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = MockProvider::new(384);
        let query = provider.embed("data subject erasure rights").await.unwrap();
        let related = provider
            .embed("The data subject shall have the right to obtain erasure")
            .await
            .unwrap();
        let unrelated = provider.embed("Quarterly budget spreadsheet").await.unwrap();

        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_stop_words_only_gives_zero_vector() {
        let provider = MockProvider::new(64);
        let embedding = provider.embed("the and yang dan").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let provider = MockProvider::new(128);
        let texts = vec!["gdpr".to_string(), "pelindungan data pribadi".to_string()];
        let batch = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], provider.embed("pelindungan data pribadi").await.unwrap());
    }
}
