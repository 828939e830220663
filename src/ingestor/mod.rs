pub mod ace_playlist;

pub use ace_playlist::parse_ace_playlist;
