pub mod auth_service;
pub mod charges;
pub mod closures;
pub mod dashboard;
pub mod delinquency;
pub mod directory;
pub mod payments;
pub mod rates;
pub mod summary;

pub use auth_service::AuthService;
pub use charges::ChargesService;
pub use closures::ClosureService;
pub use dashboard::DashboardService;
pub use delinquency::DelinquencyService;
pub use directory::DirectoryService;
pub use payments::PaymentsService;
pub use rates::RateService;
pub use summary::SummaryService;
