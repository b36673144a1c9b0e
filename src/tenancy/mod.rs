//! # Multi-tenant data plane
//!
//! Everything that routes and replicates data across tenant boundaries:
//! provisioning of per-dealer databases, the live connection registry, the
//! master-or-tenant context router, fan-out execution across all databases,
//! and catalog propagation into tenant copies.

pub mod context;
pub mod fanout;
pub mod propagation;
pub mod provisioner;
pub mod registry;

pub use context::{ContextError, DataContext, Role};
pub use fanout::{FanOutExecutor, FanOutSource};
pub use propagation::{PropagationEngine, PropagationReport};
pub use provisioner::{ProvisioningError, TenantProvisioner};
pub use registry::{RegistryError, TenantConnectionRegistry};
