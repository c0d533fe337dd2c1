pub mod chirps;

pub use chirps::ChirpRepository;
