use super::functions::{GaussianKernel, KernelFunction, TriangularKernel, UniformKernel};
use std::collections::HashMap;
use std::sync::Arc;

/// Explicit name-to-kernel registry, built once at startup and passed by
/// reference into the accumulation controller.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    kernels: HashMap<&'static str, Arc<dyn KernelFunction>>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with the built-in kernel families.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GaussianKernel));
        registry.register(Arc::new(TriangularKernel));
        registry.register(Arc::new(UniformKernel));
        registry
    }

    pub fn register(&mut self, kernel: Arc<dyn KernelFunction>) {
        self.kernels.insert(kernel.name(), kernel);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn KernelFunction>> {
        self.kernels.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.kernels.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
