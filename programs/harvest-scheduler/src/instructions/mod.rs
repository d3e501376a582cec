pub mod cancel_job;
pub mod create_harvest_job;
pub mod create_oracle_job;
pub mod cycle;
pub mod execute_harvest_job;
pub mod execute_oracle_job;
pub mod fund_queue_authority;
pub mod harvest_fees;
pub mod init_mint;
pub mod init_treasury;
pub mod initialize_config;
pub mod mint_to;
pub mod oracle_callback;
pub mod register_queue_authority;
pub mod schedule_job;
pub mod transfer;
pub mod update_config;
pub mod update_fee;

pub use cancel_job::*;
pub use create_harvest_job::*;
pub use create_oracle_job::*;
pub use execute_harvest_job::*;
pub use execute_oracle_job::*;
pub use fund_queue_authority::*;
pub use harvest_fees::*;
pub use init_mint::*;
pub use init_treasury::*;
pub use initialize_config::*;
pub use mint_to::*;
pub use oracle_callback::*;
pub use register_queue_authority::*;
pub use schedule_job::*;
pub use transfer::*;
pub use update_config::*;
pub use update_fee::*;
