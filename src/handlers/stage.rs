use log::debug;
use uuid::Uuid;

/// Progress of one request through an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    StoredOriginal,
    Sanitized,
    Flattened,
    StoredFlattened,
    Dispatching { index: usize, total: usize },
    Aggregated,
    Responded,
    Failed(String),
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::StoredOriginal => write!(f, "stored(original)"),
            Self::Sanitized => write!(f, "sanitized"),
            Self::Flattened => write!(f, "flattened"),
            Self::StoredFlattened => write!(f, "stored(flattened)"),
            Self::Dispatching { index, total } => write!(f, "dispatching({}/{})", index + 1, total),
            Self::Aggregated => write!(f, "aggregated"),
            Self::Responded => write!(f, "responded"),
            Self::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Tracks and logs stage transitions under a request id.
#[derive(Debug)]
pub struct StageTracker {
    request_id: Uuid,
    function: String,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl StageTracker {
    pub fn new(function: &str) -> Self {
        let request_id = Uuid::new_v4();
        debug!("[{}] {}: received", request_id, function);
        Self {
            request_id,
            function: function.to_string(),
            stage: PipelineStage::Received,
            history: vec![PipelineStage::Received],
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    /// Every stage visited, in order.
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    pub fn advance(&mut self, next: PipelineStage) {
        debug!("[{}] {}: {} -> {}", self.request_id, self.function, self.stage, next);
        self.history.push(next.clone());
        self.stage = next;
    }

    pub fn fail(&mut self, kind: &str) {
        self.advance(PipelineStage::Failed(kind.to_string()));
    }
}
