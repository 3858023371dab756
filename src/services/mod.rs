pub mod maintenance;
pub mod provisioner;
pub mod purger;
pub mod seeder;

pub use provisioner::{AccountProvisioner, ProvisionError, ProvisionReport, ProvisionStatus, DEMO_ACCOUNTS};
pub use purger::{DataPurger, PurgeReport};
pub use seeder::{DemoSeeder, SeedError, SeedReport};
