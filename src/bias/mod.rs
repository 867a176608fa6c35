pub(crate) mod tropo;
pub use tropo::ExponentialTroposphere;
