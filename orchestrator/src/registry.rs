use parking_lot::Mutex;

/// A registered worker, as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHandle {
    pub id: String,
    pub endpoint: String,
}

/// The append-only set of known worker endpoints.
///
/// Entries keep their registration order, which is also the order shards
/// are assigned in.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    endpoints: Mutex<Vec<String>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint if it isn't known yet.
    ///
    /// # Arguments
    /// * `endpoint` - The worker's base url.
    ///
    /// # Returns
    /// Whether the endpoint is new, and the registry size afterwards.
    pub fn register(&self, endpoint: &str) -> (bool, usize) {
        let mut endpoints = self.endpoints.lock();
        let accepted = !endpoints.iter().any(|e| e == endpoint);
        if accepted {
            endpoints.push(endpoint.to_string());
        }
        (accepted, endpoints.len())
    }

    /// Takes a consistent copy of the registry.
    ///
    /// # Returns
    /// Every worker in registration order, with ids `Worker-1..Worker-n`.
    pub fn snapshot(&self) -> Vec<WorkerHandle> {
        self.endpoints
            .lock()
            .iter()
            .enumerate()
            .map(|(i, endpoint)| WorkerHandle {
                id: format!("Worker-{}", i + 1),
                endpoint: endpoint.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
