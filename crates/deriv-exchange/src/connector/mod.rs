//! 데이터 소스 커넥터.

pub mod deriv;

pub use deriv::{DerivClient, DerivConfig};
