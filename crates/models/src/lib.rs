use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod coerce;
pub mod fallback;
pub mod settings;

pub use settings::ClientSettings;

/// Entities that can be rebuilt from an untrusted JSON payload.
///
/// Implementations never fail: every missing or malformed field is replaced
/// by a safe default through [`coerce`].
pub trait FromPayload: Sized {
	fn from_payload(value: &Value) -> Self;
}

/// Entities returned by a write. A confirmation may leave fields out; those
/// keep the value from `base`, the entity the write was meant to produce.
pub trait Reconcile: Sized {
	fn reconcile(value: &Value, base: &Self) -> Self;
}

/// Coerces a JSON array into a list of entities.
///
/// Returns `None` when the payload is not an array at all, so the caller can
/// treat it as an unusable response.
pub fn list_from_payload<T: FromPayload>(value: &Value) -> Option<Vec<T>> {
	value
		.as_array()
		.map(|items| items.iter().map(T::from_payload).collect())
}

pub const DEFAULT_BUDGET_LIMIT: f64 = 3000.0;
pub const DEFAULT_CATEGORY_COLOR: &str = "#9E9E9E";

// Budget
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BudgetState {
	pub spent: f64,
	pub limit: f64,
}

impl BudgetState {
	/// Share of the limit already spent, clamped to `[0, 100]`.
	/// A zero limit yields 0.
	pub fn percentage(&self) -> f64 {
		if self.limit > 0.0 {
			(self.spent / self.limit * 100.0).clamp(0.0, 100.0)
		} else {
			0.0
		}
	}
}

impl FromPayload for BudgetState {
	fn from_payload(value: &Value) -> Self {
		Self {
			spent: coerce::number(value.get("spent"), 0.0).max(0.0),
			limit: coerce::number(value.get("limit"), DEFAULT_BUDGET_LIMIT).max(0.0),
		}
	}
}

impl Reconcile for BudgetState {
	fn reconcile(value: &Value, base: &Self) -> Self {
		Self {
			spent: coerce::number(value.get("spent"), base.spent).max(0.0),
			limit: coerce::number(value.get("limit"), base.limit).max(0.0),
		}
	}
}

/// Body of `PUT budget`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BudgetUpdate {
	pub limit: i64,
}

// Subscriptions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
	pub name: String,
	pub icon: String,
	pub amount: f64,
	pub date: String,
}

impl FromPayload for Subscription {
	fn from_payload(value: &Value) -> Self {
		Self {
			name: coerce::text(value.get("name"), ""),
			icon: coerce::text(value.get("icon"), ""),
			amount: coerce::number(value.get("amount"), 0.0).max(0.0),
			date: coerce::text(value.get("date"), ""),
		}
	}
}

// Daily spending
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transaction {
	pub name: String,
	pub icon: String,
	pub amount: f64,
}

impl FromPayload for Transaction {
	fn from_payload(value: &Value) -> Self {
		Self {
			name: coerce::text(value.get("name"), ""),
			icon: coerce::text(value.get("icon"), ""),
			amount: coerce::number(value.get("amount"), 0.0).max(0.0),
		}
	}
}

// Spending categories
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
	pub name: String,
	pub amount: f64,
	pub color: String,
}

impl FromPayload for Category {
	fn from_payload(value: &Value) -> Self {
		Self {
			name: coerce::text(value.get("name"), ""),
			amount: coerce::number(value.get("amount"), 0.0).max(0.0),
			color: coerce::color(value.get("color"), DEFAULT_CATEGORY_COLOR),
		}
	}
}

// Savings goals
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Goal {
	pub name: String,
	/// Display label, e.g. "Jan 2030".
	pub date: String,
	pub monthly: f64,
	pub total: f64,
}

impl FromPayload for Goal {
	fn from_payload(value: &Value) -> Self {
		Self {
			name: coerce::text(value.get("name"), ""),
			date: coerce::text(value.get("date"), ""),
			monthly: coerce::number(value.get("monthly"), 0.0),
			total: coerce::number(value.get("total"), 0.0),
		}
	}
}

impl Reconcile for Goal {
	fn reconcile(value: &Value, base: &Self) -> Self {
		Self {
			name: coerce::non_blank(value.get("name"), &base.name),
			date: coerce::non_blank(value.get("date"), &base.date),
			monthly: coerce::number(value.get("monthly"), base.monthly),
			total: coerce::number(value.get("total"), base.total),
		}
	}
}

/// Converts a `YYYY-MM` month input into the short label stored on a goal
/// (`"2030-01"` becomes `"Jan 2030"`).
pub fn month_label(input: &str) -> Option<String> {
	let first_day = format!("{}-01", input.trim());
	chrono::NaiveDate::parse_from_str(&first_day, "%Y-%m-%d")
		.ok()
		.map(|date| date.format("%b %Y").to_string())
}

/// Inverse of [`month_label`]: `"Jan 2030"` becomes `"2030-01"`.
pub fn month_input(label: &str) -> Option<String> {
	let first_day = format!("01 {}", label.trim());
	chrono::NaiveDate::parse_from_str(&first_day, "%d %b %Y")
		.ok()
		.map(|date| date.format("%Y-%m").to_string())
}

// Bank connection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
	pub connected: bool,
}

impl FromPayload for ConnectionStatus {
	fn from_payload(value: &Value) -> Self {
		Self {
			connected: coerce::flag(value.get("connected"), false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_percentage_matches_default_budget() {
		let budget = fallback::budget();
		assert_eq!(format!("{:.0}", budget.percentage()), "4");
	}

	#[test]
	fn test_percentage_is_clamped() {
		let over = BudgetState { spent: 4500.0, limit: 3000.0 };
		assert_eq!(over.percentage(), 100.0);

		let zero_limit = BudgetState { spent: 10.0, limit: 0.0 };
		assert_eq!(zero_limit.percentage(), 0.0);

		let nothing_spent = BudgetState { spent: 0.0, limit: 3000.0 };
		assert_eq!(nothing_spent.percentage(), 0.0);
	}

	#[test]
	fn test_budget_payload_coercion() {
		let budget = BudgetState::from_payload(&json!({"spent": "12.5", "limit": null}));
		assert_eq!(budget, BudgetState { spent: 12.5, limit: 3000.0 });

		let negative = BudgetState::from_payload(&json!({"spent": -4, "limit": -1}));
		assert_eq!(negative, BudgetState { spent: 0.0, limit: 0.0 });

		let zero = BudgetState::from_payload(&json!({"spent": 1, "limit": 0}));
		assert_eq!(zero.limit, 0.0);
	}

	#[test]
	fn test_budget_confirmation_keeps_missing_fields() {
		let base = BudgetState { spent: 500.0, limit: 2500.0 };
		assert_eq!(BudgetState::reconcile(&json!({"message": "ok"}), &base), base);

		let partial = BudgetState::reconcile(&json!({"limit": 2400}), &base);
		assert_eq!(partial, BudgetState { spent: 500.0, limit: 2400.0 });
	}

	#[test]
	fn test_goal_confirmation_keeps_missing_fields() {
		let base = Goal {
			name: "Car".to_string(),
			date: "Jun 2027".to_string(),
			monthly: 250.0,
			total: 9000.0,
		};
		assert_eq!(Goal::reconcile(&json!({}), &base), base);

		let normalised = Goal::reconcile(&json!({"name": " ", "total": "9000.5"}), &base);
		assert_eq!(normalised.name, "Car");
		assert_eq!(normalised.total, 9000.5);
	}

	#[test]
	fn test_list_from_payload_requires_array() {
		assert!(list_from_payload::<Subscription>(&json!({"name": "x"})).is_none());
		assert!(list_from_payload::<Subscription>(&json!(null)).is_none());

		let subs = list_from_payload::<Subscription>(&json!([
			{"name": "Netflix", "icon": "🎬", "amount": 15.49, "date": "Mar 3"},
			{"name": 42, "amount": "bogus"}
		]))
		.unwrap();
		assert_eq!(subs.len(), 2);
		assert_eq!(subs[0].name, "Netflix");
		assert_eq!(subs[1].name, "42");
		assert_eq!(subs[1].amount, 0.0);
		assert_eq!(subs[1].date, "");
	}

	#[test]
	fn test_category_color_falls_back() {
		let cat = Category::from_payload(&json!({"name": "Rent", "amount": 1200, "color": "   "}));
		assert_eq!(cat.color, DEFAULT_CATEGORY_COLOR);

		let cat = Category::from_payload(&json!({"name": "Rent", "amount": 1200}));
		assert_eq!(cat.color, DEFAULT_CATEGORY_COLOR);
	}

	#[test]
	fn test_connection_status_payload() {
		assert!(ConnectionStatus::from_payload(&json!({"connected": true})).connected);
		assert!(!ConnectionStatus::from_payload(&json!({"connected": "yes"})).connected);
		assert!(!ConnectionStatus::from_payload(&json!({})).connected);
	}

	#[test]
	fn test_month_label() {
		assert_eq!(month_label("2030-01").as_deref(), Some("Jan 2030"));
		assert_eq!(month_label("2027-12").as_deref(), Some("Dec 2027"));
		assert_eq!(month_label("2030-13"), None);
		assert_eq!(month_label(""), None);
		assert_eq!(month_label("January"), None);
	}

	#[test]
	fn test_month_input_reverses_label() {
		assert_eq!(month_input("Jan 2030").as_deref(), Some("2030-01"));
		assert_eq!(month_input("sep 2028").as_deref(), Some("2028-09"));
		assert_eq!(month_input("someday"), None);
	}

	#[test]
	fn test_goal_serializes_wire_fields_only() {
		let goal = Goal {
			name: "Japan 2030".to_string(),
			date: "Jan 2030".to_string(),
			monthly: 100.0,
			total: 12000.0,
		};
		let value = serde_json::to_value(&goal).unwrap();
		assert_eq!(
			value,
			json!({"name": "Japan 2030", "date": "Jan 2030", "monthly": 100.0, "total": 12000.0})
		);
		assert_eq!(Goal::from_payload(&value), goal);
	}
}
