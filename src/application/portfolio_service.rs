use std::rc::Rc;

use crate::domain::{
    logging::{LogComponent, get_logger},
    portfolio::{PortfolioEntry, PortfolioRequest},
};
use crate::infrastructure::http::{FetchClient, HttpTransport};

/// Prices portfolio additions through the `/stock_price` endpoint.
pub struct PortfolioService<T> {
    client: Rc<FetchClient<T>>,
}

impl<T> Clone for PortfolioService<T> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone() }
    }
}

impl<T: HttpTransport> PortfolioService<T> {
    pub fn new(client: Rc<FetchClient<T>>) -> Self {
        Self { client }
    }

    /// Fetch the current price and build an entry. Failures are logged and
    /// yield `None`; nothing is surfaced to the user.
    pub async fn price_entry(&self, request: PortfolioRequest) -> Option<PortfolioEntry> {
        match self.client.stock_price(&request.stock_name).await {
            Ok(quote) => {
                get_logger().info(
                    LogComponent::Application("Portfolio"),
                    &format!("💰 {} x{} @ {}", request.stock_name, request.quantity, quote.price),
                );
                Some(PortfolioEntry {
                    stock_name: request.stock_name,
                    quantity: request.quantity,
                    price: quote.price,
                })
            }
            Err(err) => {
                get_logger().error(
                    LogComponent::Application("Portfolio"),
                    &format!("Failed to add {} to portfolio: {}", request.stock_name, err),
                );
                None
            }
        }
    }

    /// Price `request` and hand the entry to `store`. Returns whether an entry was stored.
    pub async fn add(&self, request: PortfolioRequest, store: impl FnOnce(PortfolioEntry)) -> bool {
        match self.price_entry(request).await {
            Some(entry) => {
                store(entry);
                true
            }
            None => false,
        }
    }
}
