pub mod add_to_whitelist;
pub mod initialize_extra_account_metas;
pub mod initialize_gate;
pub mod remove_from_whitelist;
pub mod transfer_hook;
pub mod update_gate_admin;

pub use add_to_whitelist::*;
pub use initialize_extra_account_metas::*;
pub use initialize_gate::*;
pub use remove_from_whitelist::*;
pub use transfer_hook::*;
pub use update_gate_admin::*;
