//! The waste list an operator builds up before saving it to the ledger.

use crate::errors::DraftError;
use crate::ledger::{
    reserved_character, LedgerKey, RawCategory, SavedItem, INGREDIENT_PREFIX, WASTED_SUFFIX,
};
use serde::{Deserialize, Serialize};

const AMOUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftItem {
    pub product: String,
    pub amount: f64,
    pub category: RawCategory,
}

impl DraftItem {
    pub fn new(product: impl Into<String>, amount: f64, category: RawCategory) -> Self {
        Self {
            product: product.into(),
            amount,
            category,
        }
    }

    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey::pending(self.product.clone(), self.category)
    }

    fn is_same(&self, product: &str, category: RawCategory) -> bool {
        self.product == product && self.category == category
    }
}

/// Unsaved waste entries, at most one per product and category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WasteDraft {
    items: Vec<DraftItem>,
}

impl WasteDraft {
    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `amount` (1 when none was typed) of a product, merging into an
    /// existing entry for the same product. Only ingredients may be counted
    /// in fractions.
    pub fn add_item(
        &mut self,
        product: &str,
        category: RawCategory,
        amount: Option<f64>,
    ) -> Result<&DraftItem, DraftError> {
        let product = product.trim();
        if product.is_empty() {
            return Err(DraftError::EmptyProduct);
        }
        check_name(product, category)?;
        let amount = amount.unwrap_or(1.0);
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DraftError::InvalidAmount(amount));
        }
        if category != RawCategory::Ingredient && amount.fract() != 0.0 {
            return Err(DraftError::FractionalAmount {
                product: product.to_string(),
                amount,
            });
        }

        let index = match self.items.iter().position(|i| i.is_same(product, category)) {
            Some(index) => {
                self.items[index].amount += amount;
                index
            }
            None => {
                self.items.push(DraftItem::new(product, amount, category));
                self.items.len() - 1
            }
        };
        Ok(&self.items[index])
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes saved amounts off the draft. Whatever failed to save, or was
    /// added while the save was in flight, stays for the next attempt.
    pub fn remove_saved(&mut self, saved: &[SavedItem]) {
        for SavedItem { item, .. } in saved {
            if let Some(entry) = self
                .items
                .iter_mut()
                .find(|i| i.is_same(&item.product, item.category))
            {
                entry.amount -= item.amount;
            }
        }
        self.items.retain(|i| i.amount > AMOUNT_EPSILON);
    }
}

/// A product name must map onto exactly one ledger key and decode back to
/// itself.
fn check_name(product: &str, category: RawCategory) -> Result<(), DraftError> {
    if let Some(character) = reserved_character(product) {
        return Err(DraftError::ReservedCharacter {
            product: product.to_string(),
            character,
        });
    }
    if product.ends_with(WASTED_SUFFIX) {
        return Err(DraftError::ReservedAffix {
            product: product.to_string(),
            convention: WASTED_SUFFIX,
        });
    }
    if category != RawCategory::Ingredient && product.starts_with(INGREDIENT_PREFIX) {
        return Err(DraftError::ReservedAffix {
            product: product.to_string(),
            convention: INGREDIENT_PREFIX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketKey;

    #[test]
    fn repeated_taps_increment_in_place() {
        let mut draft = WasteDraft::default();
        draft.add_item("Burger", RawCategory::Food, None).unwrap();
        draft.add_item("Fries", RawCategory::Food, Some(3.0)).unwrap();
        let burger = draft.add_item("Burger", RawCategory::Food, Some(2.0)).unwrap();
        assert_eq!(burger.amount, 3.0);

        assert_eq!(
            draft.items(),
            [
                DraftItem::new("Burger", 3.0, RawCategory::Food),
                DraftItem::new("Fries", 3.0, RawCategory::Food),
            ]
        );
    }

    #[test]
    fn same_name_in_another_category_is_a_separate_entry() {
        let mut draft = WasteDraft::default();
        draft.add_item("Bun", RawCategory::Food, None).unwrap();
        draft.add_item("Bun", RawCategory::Ingredient, Some(0.5)).unwrap();
        assert_eq!(draft.items().len(), 2);
        assert_eq!(draft.items()[1].ledger_key().raw(), "RW-Bun");
    }

    #[test]
    fn rejects_bad_amounts() {
        let mut draft = WasteDraft::default();
        assert_eq!(
            draft.add_item("  ", RawCategory::Food, None).unwrap_err(),
            DraftError::EmptyProduct
        );
        assert_eq!(
            draft.add_item("Burger", RawCategory::Food, Some(0.0)).unwrap_err(),
            DraftError::InvalidAmount(0.0)
        );
        assert!(matches!(
            draft.add_item("Burger", RawCategory::Food, Some(f64::NAN)),
            Err(DraftError::InvalidAmount(_))
        ));
        assert!(matches!(
            draft.add_item("Latte", RawCategory::Drink, Some(1.5)),
            Err(DraftError::FractionalAmount { .. })
        ));
        assert!(draft.is_empty());
    }

    #[test]
    fn rejects_names_that_cannot_be_a_single_key() {
        let mut draft = WasteDraft::default();
        for name in ["Соус 1/2", "Cola 0.5", "Burger #2", "Pie$", "Wrap [L]"] {
            assert!(
                matches!(
                    draft.add_item(name, RawCategory::Food, None),
                    Err(DraftError::ReservedCharacter { .. })
                ),
                "{name} was accepted"
            );
        }
        assert_eq!(
            draft.add_item("Соус 1/2", RawCategory::Food, None).unwrap_err(),
            DraftError::ReservedCharacter {
                product: "Соус 1/2".to_string(),
                character: '/',
            }
        );
        assert!(draft.is_empty());
    }

    #[test]
    fn rejects_names_that_mimic_key_conventions() {
        let mut draft = WasteDraft::default();
        assert_eq!(
            draft.add_item("Burger--wasted", RawCategory::Food, None).unwrap_err(),
            DraftError::ReservedAffix {
                product: "Burger--wasted".to_string(),
                convention: WASTED_SUFFIX,
            }
        );
        assert!(matches!(
            draft.add_item("RW-Bun--wasted", RawCategory::Ingredient, Some(1.0)),
            Err(DraftError::ReservedAffix { .. })
        ));
        assert_eq!(
            draft.add_item("RW-Bun", RawCategory::Food, None).unwrap_err(),
            DraftError::ReservedAffix {
                product: "RW-Bun".to_string(),
                convention: INGREDIENT_PREFIX,
            }
        );
        assert!(draft.add_item("RW-Bun", RawCategory::Drink, None).is_err());
        assert!(draft.is_empty());
    }

    #[test]
    fn accepted_names_decode_back_to_themselves() {
        let mut draft = WasteDraft::default();
        draft.add_item("RW-Bun", RawCategory::Ingredient, Some(0.5)).unwrap();
        draft.add_item("Картопля фрі - мала", RawCategory::Food, None).unwrap();

        let shift: BucketKey = "07-03 1SH".parse().unwrap();
        for item in draft.items() {
            let key = item.ledger_key();
            assert_eq!(LedgerKey::parse(&key.raw(), shift.feed()), key);
        }
    }

    #[test]
    fn clear_empties_the_draft() {
        let mut draft = WasteDraft::default();
        draft.add_item("Burger", RawCategory::Food, None).unwrap();
        draft.clear();
        assert!(draft.is_empty());
    }

    #[test]
    fn remove_saved_keeps_failed_and_late_additions() {
        let mut draft = WasteDraft::default();
        draft.add_item("Burger", RawCategory::Food, Some(2.0)).unwrap();
        draft.add_item("Latte", RawCategory::Drink, None).unwrap();

        let bucket: BucketKey = "07-03 1SH".parse().unwrap();
        let saved = vec![SavedItem {
            item: DraftItem::new("Burger", 2.0, RawCategory::Food),
            bucket,
        }];
        // One more burger was tapped while the save was running.
        draft.add_item("Burger", RawCategory::Food, None).unwrap();
        draft.remove_saved(&saved);

        assert_eq!(
            draft.items(),
            [
                DraftItem::new("Burger", 1.0, RawCategory::Food),
                DraftItem::new("Latte", 1.0, RawCategory::Drink),
            ]
        );
    }
}
