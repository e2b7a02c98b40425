mod hash;

pub use hash::state_root;
