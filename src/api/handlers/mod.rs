pub mod health;
pub use self::health::health;

pub mod provision;
pub use self::provision::provision;
