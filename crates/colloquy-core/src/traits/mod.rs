mod domain_advisor;
mod response_generator;
mod storage;

pub use domain_advisor::{AdvisorRequest, IDomainAdvisor};
pub use response_generator::IResponseGenerator;
pub use storage::IMemoryStorage;
