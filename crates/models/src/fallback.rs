//! Datasets substituted when a live read is unavailable.
//!
//! These mirror the demo data the backend seeds on a bank connection.

use crate::{BudgetState, Category, ConnectionStatus, Goal, Subscription, Transaction};

pub fn budget() -> BudgetState {
    BudgetState {
        spent: 119.95,
        limit: 3000.0,
    }
}

pub fn subscriptions() -> Vec<Subscription> {
    vec![Subscription {
        name: "Crunchyroll".to_string(),
        icon: "📺".to_string(),
        amount: 7.99,
        date: "Feb 15".to_string(),
    }]
}

pub fn transactions() -> Vec<Transaction> {
    [
        ("Kroger", "🛒", 45.20),
        ("Taco Bell", "🌮", 12.85),
        ("Chic-fil-a", "🍔", 15.40),
        ("Starbucks", "☕", 6.50),
        ("Gas Station", "⛽", 40.00),
    ]
    .into_iter()
    .map(|(name, icon, amount)| Transaction {
        name: name.to_string(),
        icon: icon.to_string(),
        amount,
    })
    .collect()
}

pub fn categories() -> Vec<Category> {
    [
        ("Rent", 1200.0, "#4CAF50"),
        ("Food", 400.0, "#FF9800"),
        ("Bills", 250.0, "#2196F3"),
        ("Fun", 150.0, "#E91E63"),
    ]
    .into_iter()
    .map(|(name, amount, color)| Category {
        name: name.to_string(),
        amount,
        color: color.to_string(),
    })
    .collect()
}

pub fn goals() -> Vec<Goal> {
    vec![Goal {
        name: "Japan 2030".to_string(),
        date: "Jan 2030".to_string(),
        monthly: 100.0,
        total: 12000.0,
    }]
}

pub fn connection() -> ConnectionStatus {
    ConnectionStatus { connected: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_sizes() {
        assert_eq!(subscriptions().len(), 1);
        assert_eq!(transactions().len(), 5);
        assert_eq!(categories().len(), 4);
        assert_eq!(goals().len(), 1);
    }

    #[test]
    fn test_default_subscription() {
        let sub = &subscriptions()[0];
        assert_eq!(sub.name, "Crunchyroll");
        assert_eq!(sub.amount, 7.99);
        assert_eq!(sub.date, "Feb 15");
    }

    #[test]
    fn test_default_daily_total() {
        let total: f64 = transactions().iter().map(|t| t.amount).sum();
        assert!((total - 119.95).abs() < 1e-9);
    }
}
