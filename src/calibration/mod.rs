pub mod fluids;
