use std::collections::BTreeMap;

use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal::{
        entities::{AmbiguousItem, ClarifiedItem, FoodEntry},
        value_objects::{ConfirmClarificationInput, MealType},
    },
};

#[derive(Debug, Clone, PartialEq)]
struct Selection {
    option_index: usize,
    item: ClarifiedItem,
}

/// Answers collected for a `need_clarification` response.
///
/// Lives from the moment the clarification card is shown until the
/// confirmation succeeds, the service rejects it, or the card is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingClarification {
    card_id: Uuid,
    description: String,
    clear_foods: Vec<FoodEntry>,
    ambiguous_items: Vec<AmbiguousItem>,
    selections: BTreeMap<usize, Selection>,
    confirming: bool,
}

impl PendingClarification {
    pub fn new(
        card_id: Uuid,
        description: String,
        clear_foods: Vec<FoodEntry>,
        ambiguous_items: Vec<AmbiguousItem>,
    ) -> Self {
        Self {
            card_id,
            description,
            clear_foods,
            ambiguous_items,
            selections: BTreeMap::new(),
            confirming: false,
        }
    }

    pub fn card_id(&self) -> Uuid {
        self.card_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clear_foods(&self) -> &[FoodEntry] {
        &self.clear_foods
    }

    pub fn ambiguous_items(&self) -> &[AmbiguousItem] {
        &self.ambiguous_items
    }

    /// Records the answer for `item_index`, replacing any earlier one.
    pub fn select(
        &mut self,
        item_index: usize,
        option_index: usize,
    ) -> Result<&ClarifiedItem, CoreError> {
        let item = self
            .ambiguous_items
            .get(item_index)
            .ok_or(CoreError::InvalidSelection)?;
        let option = item
            .options
            .get(option_index)
            .ok_or(CoreError::InvalidSelection)?;

        let selection = Selection {
            option_index,
            item: ClarifiedItem::from_option(item, option),
        };
        self.selections.insert(item_index, selection);

        self.selections
            .get(&item_index)
            .map(|s| &s.item)
            .ok_or(CoreError::InvalidSelection)
    }

    pub fn selected_option(&self, item_index: usize) -> Option<usize> {
        self.selections.get(&item_index).map(|s| s.option_index)
    }

    pub fn selection_count(&self) -> usize {
        self.selections.len()
    }

    pub fn is_complete(&self) -> bool {
        (0..self.ambiguous_items.len()).all(|index| self.selections.contains_key(&index))
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    pub fn set_confirming(&mut self, confirming: bool) {
        self.confirming = confirming;
    }

    /// Whether the confirm control is enabled.
    pub fn can_confirm(&self) -> bool {
        self.is_complete() && !self.confirming
    }

    /// Answers ordered by item index.
    pub fn clarified_items(&self) -> Vec<ClarifiedItem> {
        self.selections.values().map(|s| s.item.clone()).collect()
    }

    pub fn confirmation_input(&self, meal_type: MealType) -> ConfirmClarificationInput {
        ConfirmClarificationInput {
            meal_type,
            clear_foods: self.clear_foods.clone(),
            clarified_items: self.clarified_items(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meal::entities::ClarificationOption;

    fn item(food: &str, options: usize) -> AmbiguousItem {
        AmbiguousItem {
            food: food.to_string(),
            question: format!("请问{food}是什么分量？"),
            options: (0..options)
                .map(|i| ClarificationOption {
                    label: format!("选项{i}"),
                    value: format!("v{i}"),
                    calories: 100.0 * (i + 1) as f64,
                })
                .collect(),
        }
    }

    fn pending(sizes: &[usize]) -> PendingClarification {
        let items = sizes
            .iter()
            .enumerate()
            .map(|(i, n)| item(&format!("食物{i}"), *n))
            .collect();
        PendingClarification::new(Uuid::nil(), "测试".to_string(), vec![], items)
    }

    #[test]
    fn test_confirm_gated_until_every_item_answered() {
        for n in 1..=4 {
            let mut p = pending(&vec![3; n]);
            for i in 0..n {
                assert!(!p.can_confirm(), "n={n} after {i} selections");
                p.select(i, 0).unwrap();
            }
            assert!(p.can_confirm(), "n={n} complete");
            assert_eq!(p.selection_count(), n);
        }
    }

    #[test]
    fn test_reselect_overwrites_per_index() {
        let mut p = pending(&[2, 2]);
        p.select(0, 0).unwrap();
        p.select(0, 1).unwrap();
        p.select(0, 0).unwrap();
        assert_eq!(p.selection_count(), 1);
        assert!(!p.can_confirm());

        p.select(1, 1).unwrap();
        p.select(1, 0).unwrap();
        assert!(p.can_confirm());
        assert_eq!(p.selected_option(1), Some(0));
        assert_eq!(p.clarified_items().len(), 2);
    }

    #[test]
    fn test_out_of_range_selection_is_rejected() {
        let mut p = pending(&[2]);
        assert_eq!(p.select(1, 0).unwrap_err(), CoreError::InvalidSelection);
        assert_eq!(p.select(0, 2).unwrap_err(), CoreError::InvalidSelection);
        assert_eq!(p.selection_count(), 0);
    }

    #[test]
    fn test_clarified_items_follow_item_order() {
        let mut p = pending(&[2, 2, 2]);
        p.select(2, 1).unwrap();
        p.select(0, 0).unwrap();
        p.select(1, 1).unwrap();

        let input = p.confirmation_input(MealType::Dinner);
        let foods: Vec<_> = input.clarified_items.iter().map(|c| c.food.as_str()).collect();
        assert_eq!(foods, ["食物0", "食物1", "食物2"]);
        assert_eq!(input.clarified_items[2].selected_label, "选项1");
        assert_eq!(input.clarified_items[2].calories, 200.0);
    }

    #[test]
    fn test_confirming_disables_confirm() {
        let mut p = pending(&[1]);
        p.select(0, 0).unwrap();
        p.set_confirming(true);
        assert!(!p.can_confirm());
        p.set_confirming(false);
        assert!(p.can_confirm());
    }

    #[test]
    fn test_no_ambiguous_items_is_complete() {
        let p = pending(&[]);
        assert!(p.can_confirm());
    }
}
