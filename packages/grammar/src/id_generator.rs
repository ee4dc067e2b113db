use crate::element::ElementId;
use crc32fast::Hasher;

/// Generate a diagram seed from the sentence text using CRC32
pub fn get_diagram_seed(text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(text.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Source of fresh element ids.
///
/// Passed explicitly into every call that creates elements so diagram
/// construction stays deterministic.
pub trait IdGenerator {
    fn next_id(&mut self) -> ElementId;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> ElementId,
{
    fn next_id(&mut self) -> ElementId {
        self()
    }
}

/// Sequential id generator for the elements of one diagram
#[derive(Debug, Clone)]
pub struct SerialIds {
    seed: String,
    count: u32,
}

impl SerialIds {
    /// Seed the generator from the sentence being diagrammed
    pub fn for_text(text: &str) -> Self {
        Self::from_seed(get_diagram_seed(text))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl IdGenerator for SerialIds {
    fn next_id(&mut self) -> ElementId {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}
