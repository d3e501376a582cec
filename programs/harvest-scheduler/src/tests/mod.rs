mod chain_flow;
mod harness;
mod harvest_flow;
