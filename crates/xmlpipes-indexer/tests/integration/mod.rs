mod export_cycle;
mod simple_strategy;
mod updates;
