mod sources;
pub use sources::TagSources;

mod job;
pub use job::JobRequest;

mod provisioner;
pub use provisioner::ProvisionerRequest;
