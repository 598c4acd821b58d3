mod flake;

pub use flake::*;
