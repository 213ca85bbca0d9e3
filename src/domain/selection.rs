//! Selection aggregate - what one guest group claimed in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use uuid::Uuid;

/// A confirmed line item. Gift id and name are a snapshot taken at claim time.
///
/// Serializes with its computed `value` alongside the stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedItem {
    pub gift_id: Uuid,
    pub gift_name: String,
    /// 1 for an integral gift, number of quotas for a fractional one
    pub quantity: u32,
    /// Value of one quota; `None` for integral gifts
    pub unit_value: Option<Decimal>,
}

impl ConfirmedItem {
    /// Value contributed by this item to the selection total.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.unit_value
            .map_or(Decimal::ZERO, |unit| unit * Decimal::from(self.quantity))
    }
}

/// Serializes with its computed `totalValue`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_group_id: Uuid,
    pub selected_at: DateTime<Utc>,
    pub items: Vec<ConfirmedItem>,
}

impl Selection {
    /// Sum of the fractional items' values. Integral gifts carry no value.
    #[must_use]
    pub fn total_value(&self) -> Decimal {
        self.items.iter().map(ConfirmedItem::value).sum()
    }

    #[must_use]
    pub fn gift_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.gift_id).collect()
    }
}

impl Serialize for ConfirmedItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut item = serializer.serialize_struct("ConfirmedItem", 5)?;
        item.serialize_field("giftId", &self.gift_id)?;
        item.serialize_field("giftName", &self.gift_name)?;
        item.serialize_field("quantity", &self.quantity)?;
        item.serialize_field("unitValue", &self.unit_value)?;
        item.serialize_field("value", &self.value())?;
        item.end()
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut selection = serializer.serialize_struct("Selection", 6)?;
        selection.serialize_field("id", &self.id)?;
        selection.serialize_field("eventId", &self.event_id)?;
        selection.serialize_field("guestGroupId", &self.guest_group_id)?;
        selection.serialize_field("selectedAt", &self.selected_at)?;
        selection.serialize_field("totalValue", &self.total_value())?;
        selection.serialize_field("items", &self.items)?;
        selection.end()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_total_value_ignores_integral_items() {
        let selection = Selection {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            guest_group_id: Uuid::new_v4(),
            selected_at: Utc::now(),
            items: vec![
                ConfirmedItem {
                    gift_id: Uuid::new_v4(),
                    gift_name: "Fridge".to_string(),
                    quantity: 3,
                    unit_value: Some(Decimal::new(20000, 2)),
                },
                ConfirmedItem {
                    gift_id: Uuid::new_v4(),
                    gift_name: "Toaster".to_string(),
                    quantity: 1,
                    unit_value: None,
                },
            ],
        };

        assert_eq!(selection.total_value(), Decimal::from(600));
        assert_eq!(selection.gift_ids().len(), 2);
    }

    #[test]
    fn test_serialized_selection_carries_values() {
        let selection = Selection {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            guest_group_id: Uuid::new_v4(),
            selected_at: Utc::now(),
            items: vec![ConfirmedItem {
                gift_id: Uuid::new_v4(),
                gift_name: "Fridge".to_string(),
                quantity: 3,
                unit_value: Some(Decimal::new(20000, 2)),
            }],
        };

        let json = serde_json::to_value(&selection).unwrap();
        let decimal = |value: &serde_json::Value| value.as_str().unwrap().parse::<Decimal>().unwrap();
        assert_eq!(decimal(&json["totalValue"]), Decimal::from(600));
        assert_eq!(decimal(&json["items"][0]["value"]), Decimal::from(600));
        assert_eq!(decimal(&json["items"][0]["unitValue"]), Decimal::from(200));
        assert_eq!(json["items"][0]["quantity"], 3);
        assert_eq!(json["id"], selection.id.to_string());

        let back: Selection = serde_json::from_value(json).unwrap();
        assert_eq!(back.items, selection.items);
    }
}
