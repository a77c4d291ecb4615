//! Activity-log records and their display-friendly descriptions.
//!
//! `details` payloads arrive from clients either as an already-structured
//! object or as a serialized JSON string. The difference is resolved here,
//! at the boundary; `describe` and everything downstream only ever see the
//! resolved field map. A payload that fails to parse resolves to an empty
//! map, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityDetails {
    Structured(Map<String, Value>),
    Raw(String),
}

impl Default for ActivityDetails {
    fn default() -> Self {
        Self::Structured(Map::new())
    }
}

impl ActivityDetails {
    /// The resolved field map. `Raw` payloads are parsed as a JSON object;
    /// parse failures and non-object payloads resolve to an empty map.
    pub fn fields(&self) -> Map<String, Value> {
        match self {
            Self::Structured(map) => map.clone(),
            Self::Raw(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
        }
    }

    /// The payload as display text: raw strings verbatim, structured maps
    /// stringified.
    pub fn display_text(&self) -> String {
        match self {
            Self::Raw(raw) => raw.clone(),
            Self::Structured(map) => Value::Object(map.clone()).to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: ActivityId,
    pub action: String,
    pub user_name: String,
    pub details: ActivityDetails,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(
        action: impl Into<String>,
        user_name: impl Into<String>,
        details: ActivityDetails,
    ) -> Self {
        Self {
            id: ActivityId(Uuid::new_v4().to_string()),
            action: action.into(),
            user_name: user_name.into(),
            details,
            occurred_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    StockIn,
    StockOut,
    Inventory,
    Session,
    Organization,
    Other,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockIn => "stock_in",
            Self::StockOut => "stock_out",
            Self::Inventory => "inventory",
            Self::Session => "session",
            Self::Organization => "organization",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescription {
    pub label: String,
    pub description: String,
    pub category: ActivityCategory,
}

/// Maps a raw event to its display triple. Pure; unknown actions fall back
/// to a title-cased label and the raw details as description.
pub fn describe(event: &ActivityEvent) -> ActivityDescription {
    let fields = event.details.fields();
    let user = event.user_name.as_str();

    match event.action.as_str() {
        "stock_movement" => describe_stock_movement(user, &fields),
        "item_created" => ActivityDescription {
            label: "Item created".to_string(),
            description: format!("{user} added {} to the catalog", item_name(&fields)),
            category: ActivityCategory::Inventory,
        },
        "item_updated" => ActivityDescription {
            label: "Item updated".to_string(),
            description: format!("{user} updated {}", item_name(&fields)),
            category: ActivityCategory::Inventory,
        },
        "item_deleted" => ActivityDescription {
            label: "Item deleted".to_string(),
            description: format!("{user} removed {} from the catalog", item_name(&fields)),
            category: ActivityCategory::Inventory,
        },
        "user_login" => ActivityDescription {
            label: "Signed in".to_string(),
            description: format!("{user} signed in"),
            category: ActivityCategory::Session,
        },
        "user_logout" => ActivityDescription {
            label: "Signed out".to_string(),
            description: format!("{user} signed out"),
            category: ActivityCategory::Session,
        },
        "manager_assigned" => ActivityDescription {
            label: "Manager assigned".to_string(),
            description: format!(
                "{user} assigned {} to {}",
                text_field(&fields, "manager_name").unwrap_or_else(|| "a manager".to_string()),
                text_field(&fields, "branch_name").unwrap_or_else(|| "a branch".to_string()),
            ),
            category: ActivityCategory::Organization,
        },
        other => ActivityDescription {
            label: title_case(other),
            description: event.details.display_text(),
            category: ActivityCategory::Other,
        },
    }
}

fn describe_stock_movement(user: &str, fields: &Map<String, Value>) -> ActivityDescription {
    let quantity = fields.get("quantity").map(value_text).unwrap_or_else(|| "?".to_string());
    let reason =
        text_field(fields, "reason").unwrap_or_else(|| "no reason given".to_string());

    match text_field(fields, "movement_type").as_deref() {
        Some("in") => ActivityDescription {
            label: "Stock received".to_string(),
            description: format!("{user} received {quantity} units ({reason})"),
            category: ActivityCategory::StockIn,
        },
        Some("out") => ActivityDescription {
            label: "Stock dispatched".to_string(),
            description: format!("{user} dispatched {quantity} units ({reason})"),
            category: ActivityCategory::StockOut,
        },
        _ => ActivityDescription {
            label: "Stock movement".to_string(),
            description: format!("{user} recorded a stock movement"),
            category: ActivityCategory::Inventory,
        },
    }
}

fn item_name(fields: &Map<String, Value>) -> String {
    text_field(fields, "item_name").unwrap_or_else(|| "an item".to_string())
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).map(value_text)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `custom_event` -> `Custom Event`.
fn title_case(action: &str) -> String {
    action
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{describe, ActivityCategory, ActivityDetails, ActivityEvent};

    fn structured(value: Value) -> ActivityDetails {
        match value {
            Value::Object(map) => ActivityDetails::Structured(map),
            _ => panic!("fixture details must be an object"),
        }
    }

    #[test]
    fn stock_in_movement_gets_received_description() {
        let event = ActivityEvent::new(
            "stock_movement",
            "Ada",
            structured(json!({"movement_type": "in", "quantity": 5, "reason": "restock"})),
        );

        let described = describe(&event);

        assert_eq!(described.label, "Stock received");
        assert_eq!(described.description, "Ada received 5 units (restock)");
        assert_eq!(described.category, ActivityCategory::StockIn);
        assert_eq!(described.category.as_str(), "stock_in");
    }

    #[test]
    fn stock_out_movement_gets_dispatched_description() {
        let event = ActivityEvent::new(
            "stock_movement",
            "Grace",
            structured(json!({"movement_type": "out", "quantity": 12, "reason": "transfer"})),
        );

        let described = describe(&event);

        assert_eq!(described.label, "Stock dispatched");
        assert_eq!(described.description, "Grace dispatched 12 units (transfer)");
        assert_eq!(described.category, ActivityCategory::StockOut);
    }

    #[test]
    fn serialized_details_resolve_like_structured_ones() {
        let event = ActivityEvent::new(
            "stock_movement",
            "Ada",
            ActivityDetails::Raw(
                r#"{"movement_type":"in","quantity":5,"reason":"restock"}"#.to_string(),
            ),
        );

        assert_eq!(describe(&event).description, "Ada received 5 units (restock)");
    }

    #[test]
    fn unparseable_details_resolve_to_empty_map() {
        let details = ActivityDetails::Raw("not json at all".to_string());
        assert_eq!(details.fields(), Map::new());

        let event = ActivityEvent::new("stock_movement", "Ada", details);
        let described = describe(&event);
        assert_eq!(described.label, "Stock movement");
        assert_eq!(described.description, "Ada recorded a stock movement");
    }

    #[test]
    fn non_object_json_details_resolve_to_empty_map() {
        let details = ActivityDetails::Raw("[1, 2, 3]".to_string());
        assert_eq!(details.fields(), Map::new());
    }

    #[test]
    fn unknown_action_falls_back_to_title_case_label() {
        let event =
            ActivityEvent::new("custom_event", "Ada", ActivityDetails::Raw("went fine".to_string()));

        let described = describe(&event);

        assert_eq!(described.label, "Custom Event");
        assert_eq!(described.description, "went fine");
        assert_eq!(described.category, ActivityCategory::Other);
    }

    #[test]
    fn unknown_action_with_structured_details_stringifies_them() {
        let event =
            ActivityEvent::new("custom_event", "Ada", structured(json!({"status": "done"})));

        assert_eq!(describe(&event).description, r#"{"status":"done"}"#);
    }

    #[test]
    fn wire_details_decode_as_object_or_string() {
        let from_object: ActivityDetails =
            serde_json::from_str(r#"{"quantity": 5}"#).expect("object decodes");
        assert!(matches!(from_object, ActivityDetails::Structured(_)));

        let from_string: ActivityDetails =
            serde_json::from_str(r#""{\"quantity\": 5}""#).expect("string decodes");
        assert!(matches!(from_string, ActivityDetails::Raw(_)));
        assert_eq!(from_string.fields().get("quantity"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn item_lifecycle_actions_use_inventory_category() {
        for (action, fragment) in
            [("item_created", "added"), ("item_updated", "updated"), ("item_deleted", "removed")]
        {
            let event =
                ActivityEvent::new(action, "Ada", structured(json!({"item_name": "SKU-17"})));
            let described = describe(&event);
            assert_eq!(described.category, ActivityCategory::Inventory);
            assert!(described.description.contains(fragment), "{action}");
            assert!(described.description.contains("SKU-17"), "{action}");
        }
    }
}
