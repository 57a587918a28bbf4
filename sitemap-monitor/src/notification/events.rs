//! Notification events and their plain-text rendering.

/// A product id with its canonical storefront URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    pub id: String,
    pub url: String,
}

impl ProductLink {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Events that produce a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Products whose probe URL now resolves.
    ProductsLive { products: Vec<ProductLink> },
    /// Products listed in the sitemap that are not reachable yet.
    ProductsDetected { products: Vec<ProductLink> },
}

impl NotificationEvent {
    pub fn products_live(products: Vec<ProductLink>) -> Self {
        Self::ProductsLive { products }
    }

    pub fn products_detected(products: Vec<ProductLink>) -> Self {
        Self::ProductsDetected { products }
    }

    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProductsLive { .. } => "products_live",
            Self::ProductsDetected { .. } => "products_detected",
        }
    }

    pub fn products(&self) -> &[ProductLink] {
        match self {
            Self::ProductsLive { products } | Self::ProductsDetected { products } => products,
        }
    }

    pub fn title(&self) -> String {
        let count = self.products().len();
        let noun = if count == 1 { "product" } else { "products" };
        match self {
            Self::ProductsLive { .. } => format!("{count} {noun} now available"),
            Self::ProductsDetected { .. } => {
                format!("{count} {noun} detected but not yet available")
            }
        }
    }

    /// Self-contained message body: the title followed by one line per product.
    pub fn message(&self) -> String {
        let mut message = self.title();
        for product in self.products() {
            message.push_str("\n- ");
            message.push_str(&product.id);
            message.push_str(": ");
            message.push_str(&product.url);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_message_lists_every_product() {
        let event = NotificationEvent::products_live(vec![
            ProductLink::new("C", "https://shop.example.com/item/C"),
            ProductLink::new("E", "https://shop.example.com/item/E"),
        ]);

        assert_eq!(event.event_type(), "products_live");
        assert_eq!(
            event.message(),
            "2 products now available\n\
             - C: https://shop.example.com/item/C\n\
             - E: https://shop.example.com/item/E"
        );
    }

    #[test]
    fn test_detected_title_is_singular_for_one() {
        let event = NotificationEvent::products_detected(vec![ProductLink::new(
            "D",
            "https://shop.example.com/item/D",
        )]);
        assert_eq!(event.title(), "1 product detected but not yet available");
        assert!(event.message().contains("D: https://shop.example.com/item/D"));
    }
}
