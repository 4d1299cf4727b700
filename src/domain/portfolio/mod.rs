//! Portfolio of holdings, independent of the prediction pipeline.

use serde::Serialize;

use crate::domain::{errors::AppError, market_data::Symbol};

/// One holding priced at the moment it was added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioEntry {
    pub stock_name: Symbol,
    pub quantity: u32,
    pub price: f64,
}

impl PortfolioEntry {
    pub fn value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Form input for a new holding, before its price is known.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRequest {
    pub stock_name: Symbol,
    pub quantity: u32,
}

impl PortfolioRequest {
    /// Validate raw form fields: a non-empty symbol and a positive whole quantity.
    pub fn parse(stock_name: &str, quantity: &str) -> Result<Self, AppError> {
        let stock_name = Symbol::new(stock_name)?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| AppError::Validation("Quantity must be a positive whole number".to_string()))?;
        Ok(Self { stock_name, quantity })
    }
}

/// Ordered, index-addressed list of holdings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Portfolio {
    entries: Vec<PortfolioEntry>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: PortfolioEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `index`; out-of-range indices leave the list untouched.
    pub fn remove(&mut self, index: usize) -> Option<PortfolioEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_value(&self) -> f64 {
        self.entries.iter().map(PortfolioEntry::value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, quantity: u32, price: f64) -> PortfolioEntry {
        PortfolioEntry { stock_name: Symbol::from(name), quantity, price }
    }

    #[test]
    fn add_and_remove_by_index() {
        let mut portfolio = Portfolio::new();
        portfolio.add(entry("AAA", 1, 10.0));
        portfolio.add(entry("BBB", 2, 20.0));
        portfolio.add(entry("CCC", 3, 30.0));

        assert_eq!(portfolio.remove(1), Some(entry("BBB", 2, 20.0)));
        let names: Vec<_> = portfolio.entries().iter().map(|e| e.stock_name.value()).collect();
        assert_eq!(names, vec!["AAA", "CCC"]);

        assert_eq!(portfolio.remove(7), None);
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.total_value(), 100.0);
    }

    #[test]
    fn request_parsing() {
        let request = PortfolioRequest::parse(" xyz ", "10").unwrap();
        assert_eq!(request.stock_name.value(), "xyz");
        assert_eq!(request.quantity, 10);

        assert!(PortfolioRequest::parse("", "1").is_err());
        assert!(PortfolioRequest::parse("XYZ", "0").is_err());
        assert!(PortfolioRequest::parse("XYZ", "-3").is_err());
        assert!(PortfolioRequest::parse("XYZ", "2.5").is_err());
    }

    #[test]
    fn removing_only_entry_empties_list() {
        let mut portfolio = Portfolio::new();
        portfolio.add(entry("XYZ", 10, 42.5));
        portfolio.remove(0);
        assert!(portfolio.is_empty());
    }
}
