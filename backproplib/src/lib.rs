pub mod neural_network;
pub mod mnist;
pub mod tank;

pub mod prelude {
    pub use super::neural_network::prelude::*;
    pub use super::mnist::*;
    pub use super::tank::*;
}
