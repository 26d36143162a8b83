pub mod catlist;
pub mod machine_type;
pub mod status;
pub mod util;

pub use catlist::CatlistCategory;
pub use machine_type::MachineType;
pub use status::{DriverStatus, DumpStatus, FeatureStatus, SoftwareListKind, SoftwareSupport};

/// Short machine-readable identifier for a machine, unique across the
/// machine namespace. Distinct from the human-readable display name.
pub type Basename = String;

/// Short identifier for a software item, unique within its software list.
pub type SoftwareBasename = String;

/// Short identifier for a software list (the stem of its hash `.xml` file).
pub type SoftwareListBasename = String;
