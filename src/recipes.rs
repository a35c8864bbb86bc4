//! Drink recipes and the units ingredient totals are reported in.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-unit ingredient use of each sold drink, in grams, millilitres or
/// pieces.
const STANDARD_RECIPES: &[(&str, &[(&str, f64)])] = &[
    ("Еспресо", &[("Кава", 8.0)]),
    ("Доппіо", &[("Кава", 16.0)]),
    ("Американо", &[("Кава", 8.0)]),
    ("Американо з молоком", &[("Кава", 8.0), ("Молоко", 50.0)]),
    ("Капучино", &[("Кава", 8.0), ("Молоко", 150.0)]),
    ("Лате", &[("Кава", 8.0), ("Молоко", 200.0)]),
    ("Флет Уайт", &[("Кава", 16.0), ("Молоко", 120.0)]),
    ("Какао", &[("Молоко", 200.0)]),
    ("Чай зелений", &[("Чай зелений", 1.0)]),
    ("Чай чорний", &[("Чай чорний", 1.0)]),
    ("Кока-Кола", &[("Сироп кола", 50.0)]),
    ("Спрайт", &[("Сироп спрайт", 50.0)]),
    ("Фанта", &[("Сироп фанта", 50.0)]),
    ("Сік апельсиновий", &[("Концентрат соку", 60.0)]),
];

/// Divisor that turns a summed raw amount into the reporting unit.
const STANDARD_UNITS: &[(&str, &str, f64)] = &[
    ("Кава", "кг.", 1000.0),
    ("Молоко", "л.", 1000.0),
    ("Концентрат соку", "л.", 1000.0),
    ("Сироп кола", "л.", 1000.0),
    ("Сироп спрайт", "л.", 1000.0),
    ("Сироп фанта", "л.", 1000.0),
    ("Чай зелений", "шт.", 1.0),
    ("Чай чорний", "шт.", 1.0),
];

static STANDARD: Lazy<RecipeBook> = Lazy::new(|| {
    let book = STANDARD_RECIPES
        .iter()
        .fold(RecipeBook::new(), |book, (product, ingredients)| {
            book.with_recipe(product, ingredients)
        });
    STANDARD_UNITS
        .iter()
        .fold(book, |book, (ingredient, label, divisor)| {
            book.with_unit(ingredient, label, *divisor)
        })
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub label: String,
    pub divisor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientLine {
    pub ingredient: String,
    pub amount: f64,
    pub unit: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: BTreeMap<String, BTreeMap<String, f64>>,
    units: BTreeMap<String, Unit>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables the service ships with.
    pub fn standard() -> &'static RecipeBook {
        &STANDARD
    }

    pub fn with_recipe(mut self, product: &str, ingredients: &[(&str, f64)]) -> Self {
        let recipe = ingredients
            .iter()
            .map(|(name, per_unit)| (name.to_string(), *per_unit))
            .collect();
        self.recipes.insert(product.to_string(), recipe);
        self
    }

    pub fn with_unit(mut self, ingredient: &str, label: &str, divisor: f64) -> Self {
        self.units.insert(
            ingredient.to_string(),
            Unit {
                label: label.to_string(),
                divisor,
            },
        );
        self
    }

    pub fn recipe(&self, product: &str) -> Option<&BTreeMap<String, f64>> {
        self.recipes.get(product)
    }

    /// Total raw ingredient use for the given product quantities. Products
    /// without a recipe contribute nothing.
    pub fn aggregate<'a, I>(&self, sales: I) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut totals = BTreeMap::new();
        for (product, quantity) in sales {
            let Some(recipe) = self.recipe(product) else {
                continue;
            };
            for (ingredient, per_unit) in recipe {
                *totals.entry(ingredient.clone()).or_insert(0.0) += per_unit * quantity;
            }
        }
        totals
    }

    pub fn display(&self, totals: &BTreeMap<String, f64>) -> Vec<IngredientLine> {
        totals
            .iter()
            .map(|(ingredient, raw)| match self.units.get(ingredient) {
                Some(unit) => {
                    let amount = raw / unit.divisor;
                    IngredientLine {
                        ingredient: ingredient.clone(),
                        amount,
                        unit: Some(unit.label.clone()),
                        text: format!("{amount:.2} {}", unit.label),
                    }
                }
                None => IngredientLine {
                    ingredient: ingredient.clone(),
                    amount: *raw,
                    unit: None,
                    text: format!("{raw:.2}"),
                },
            })
            .collect()
    }
}
