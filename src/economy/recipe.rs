//! Production recipes and food-upkeep rules
//!
//! Recipes specify the inputs a facility consumes, the outputs it produces,
//! and how long one cycle takes. Food rules specify the upkeep a staffed
//! facility draws from the settlement's food supply.

use serde::{Deserialize, Serialize};

use crate::economy::resources::ResourceKind;

/// A processing recipe: consume inputs, produce outputs, per cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Input resources consumed per cycle
    pub consumes: Vec<(ResourceKind, u32)>,
    /// Output resources produced per cycle
    pub produces: Vec<(ResourceKind, u32)>,
    /// Time units for one production cycle
    pub cycle_duration: f32,
}

/// Food upkeep rule for a staffed facility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodRule {
    /// Food kinds accepted, drawn in listed order
    pub accepted: Vec<ResourceKind>,
    /// Units of food needed per worker per check
    pub rate_per_worker: u32,
    /// Time units between upkeep checks
    pub check_interval: f32,
}

/// Catalog of all available recipes
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load default recipes (hardcoded for now)
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add(Recipe {
            id: "bake_bread".into(),
            name: "Bake Bread".into(),
            consumes: vec![(ResourceKind::Flour, 1), (ResourceKind::CoalOre, 1)],
            produces: vec![(ResourceKind::Bread, 3)],
            cycle_duration: 20000.0,
        });

        catalog.add(Recipe {
            id: "mill_flour".into(),
            name: "Mill Flour".into(),
            consumes: vec![(ResourceKind::Grain, 1)],
            produces: vec![(ResourceKind::Flour, 1)],
            cycle_duration: 12000.0,
        });

        catalog.add(Recipe {
            id: "saw_planks".into(),
            name: "Saw Planks".into(),
            consumes: vec![(ResourceKind::Wood, 1)],
            produces: vec![(ResourceKind::Plank, 2)],
            cycle_duration: 8000.0,
        });

        catalog
    }

    /// Add a recipe to the catalog
    pub fn add(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    /// Get a recipe by ID
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Get all recipes
    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Load recipes from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, RecipeLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecipeLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse recipes from TOML string
    pub fn parse_toml(content: &str) -> Result<Self, RecipeLoadError> {
        let toml_data: TomlRecipes =
            toml::from_str(content).map_err(|e| RecipeLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::new();
        for recipe in toml_data.recipes {
            catalog.add(recipe.into_recipe()?);
        }
        Ok(catalog)
    }
}

/// Error type for recipe loading
#[derive(Debug, Clone)]
pub enum RecipeLoadError {
    IoError(String),
    ParseError(String),
    InvalidResourceKind(String),
    InvalidRecipe(String),
}

impl std::fmt::Display for RecipeLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeLoadError::IoError(e) => write!(f, "IO error: {}", e),
            RecipeLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            RecipeLoadError::InvalidResourceKind(e) => write!(f, "Invalid resource kind: {}", e),
            RecipeLoadError::InvalidRecipe(e) => write!(f, "Invalid recipe: {}", e),
        }
    }
}

impl std::error::Error for RecipeLoadError {}

/// TOML representation of recipes file
#[derive(Debug, Deserialize)]
struct TomlRecipes {
    recipes: Vec<TomlRecipe>,
}

/// TOML representation of a single recipe
#[derive(Debug, Deserialize)]
struct TomlRecipe {
    id: String,
    name: String,
    #[serde(default)]
    consumes: Vec<TomlResourceAmount>,
    produces: Vec<TomlResourceAmount>,
    cycle_duration: f32,
}

/// TOML representation of a resource amount
#[derive(Debug, Deserialize)]
struct TomlResourceAmount {
    resource: String,
    amount: u32,
}

impl TomlRecipe {
    fn into_recipe(self) -> Result<Recipe, RecipeLoadError> {
        if self.produces.is_empty() {
            return Err(RecipeLoadError::InvalidRecipe(format!(
                "recipe '{}' produces nothing",
                self.id
            )));
        }
        if self.cycle_duration <= 0.0 {
            return Err(RecipeLoadError::InvalidRecipe(format!(
                "recipe '{}' has non-positive cycle_duration",
                self.id
            )));
        }

        let consumes = self
            .consumes
            .into_iter()
            .map(|ra| ra.into_resource_amount())
            .collect::<Result<Vec<_>, _>>()?;

        let produces = self
            .produces
            .into_iter()
            .map(|ra| ra.into_resource_amount())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Recipe {
            id: self.id,
            name: self.name,
            consumes,
            produces,
            cycle_duration: self.cycle_duration,
        })
    }
}

impl TomlResourceAmount {
    fn into_resource_amount(self) -> Result<(ResourceKind, u32), RecipeLoadError> {
        let resource = match self.resource.to_lowercase().as_str() {
            "wood" => ResourceKind::Wood,
            "stone" => ResourceKind::Stone,
            "iron_ore" => ResourceKind::IronOre,
            "coal_ore" => ResourceKind::CoalOre,
            "plank" => ResourceKind::Plank,
            "grain" => ResourceKind::Grain,
            "flour" => ResourceKind::Flour,
            "bread" => ResourceKind::Bread,
            "fish" => ResourceKind::Fish,
            _ => return Err(RecipeLoadError::InvalidResourceKind(self.resource)),
        };
        Ok((resource, self.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_defaults() {
        let catalog = RecipeCatalog::with_defaults();

        let bread = catalog.get("bake_bread").unwrap();
        assert_eq!(bread.consumes.len(), 2);
        assert_eq!(bread.produces, vec![(ResourceKind::Bread, 3)]);
        assert!((bread.cycle_duration - 20000.0).abs() < 0.01);

        assert!(catalog.get("mill_flour").is_some());
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [[recipes]]
            id = "smelt"
            name = "Smelt"
            cycle_duration = 100.0
            consumes = [{ resource = "iron_ore", amount = 2 }, { resource = "coal_ore", amount = 1 }]
            produces = [{ resource = "plank", amount = 1 }]
        "#;

        let catalog = RecipeCatalog::parse_toml(toml).unwrap();
        let recipe = catalog.get("smelt").unwrap();
        assert_eq!(recipe.consumes[0], (ResourceKind::IronOre, 2));
        assert_eq!(recipe.produces[0], (ResourceKind::Plank, 1));
    }

    #[test]
    fn test_parse_toml_no_consumes_ok() {
        let toml = r#"
            [[recipes]]
            id = "grow"
            name = "Grow Grain"
            cycle_duration = 50.0
            produces = [{ resource = "grain", amount = 1 }]
        "#;

        let catalog = RecipeCatalog::parse_toml(toml).unwrap();
        assert!(catalog.get("grow").unwrap().consumes.is_empty());
    }

    #[test]
    fn test_parse_toml_rejects_bad_resource() {
        let toml = r#"
            [[recipes]]
            id = "bad"
            name = "Bad"
            cycle_duration = 10.0
            produces = [{ resource = "mithril", amount = 1 }]
        "#;

        assert!(matches!(
            RecipeCatalog::parse_toml(toml),
            Err(RecipeLoadError::InvalidResourceKind(_))
        ));
    }

    #[test]
    fn test_parse_toml_rejects_empty_produces() {
        let toml = r#"
            [[recipes]]
            id = "noop"
            name = "Noop"
            cycle_duration = 10.0
            produces = []
        "#;

        assert!(matches!(
            RecipeCatalog::parse_toml(toml),
            Err(RecipeLoadError::InvalidRecipe(_))
        ));
    }
}
