//! GenericService: the seam in front of a repository.

mod generic;
pub use generic::GenericService;
