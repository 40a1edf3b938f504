//! Settlement economy: resources, inventories, recipes, facilities

pub mod facility;
pub mod inventory;
pub mod recipe;
pub mod resources;
pub mod stockpile;

pub use facility::{Facility, FacilityEvent, FacilityKind};
pub use inventory::{CarriedLoad, Inventory};
pub use recipe::{FoodRule, Recipe, RecipeCatalog};
pub use resources::ResourceKind;
pub use stockpile::Stockpile;
