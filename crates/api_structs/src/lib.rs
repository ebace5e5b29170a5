mod rappel;
mod status;

pub mod dtos {
    pub use crate::rappel::dtos::*;
}

pub use crate::rappel::api::*;
pub use crate::status::api::*;
