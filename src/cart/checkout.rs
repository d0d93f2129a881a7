//! Order hand-off to the messaging channel
//!
//! Checkout does not place an order itself: it renders the cart as a plain
//! text message and a link that opens a chat with the shop prefilled with it.

use super::models::{CartLine, CartTotals};
use serde::Serialize;
use url::form_urlencoded;

/// Base of the chat link; the recipient number is appended as a path segment.
pub const HANDOFF_BASE_URL: &str = "https://wa.me/";

/// A rendered order ready to be opened in the messaging client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderHandoff {
    pub message: String,
    pub url: String,
}

/// Renders the order summary and the chat link for `recipient`.
pub fn build_handoff(lines: &[CartLine], totals: &CartTotals, recipient: &str) -> OrderHandoff {
    let message = format_order_message(lines, totals);
    let recipient: String = recipient.chars().filter(char::is_ascii_digit).collect();
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    OrderHandoff {
        url: format!("{HANDOFF_BASE_URL}{recipient}?text={text}"),
        message,
    }
}

/// Numbered, one block per line, with two-decimal amounts.
pub fn format_order_message(lines: &[CartLine], totals: &CartTotals) -> String {
    let mut message = String::from("*Order*\n\n");
    for (index, line) in lines.iter().enumerate() {
        message.push_str(&format!(
            "{}. *{}*\n   Brand: {}\n   Quantity: {}\n   Unit price: {:.2}\n   Subtotal: {:.2}\n\n",
            index + 1,
            line.name,
            line.brand,
            line.quantity,
            line.unit_price,
            line.subtotal(),
        ));
    }
    message.push_str(&format!(
        "*Total: {:.2}*\n\nI would like to complete this order.",
        totals.amount
    ));
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::helpers::compute_totals;

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine {
                product_id: "p1".into(),
                name: "Whey 900g".into(),
                brand: "Buffalo".into(),
                unit_price: 99.9,
                image_url: String::new(),
                quantity: 2,
                stock_limit: 5,
            },
            CartLine {
                product_id: "p2".into(),
                name: "Creatine".into(),
                brand: "Toyama".into(),
                unit_price: 45.0,
                image_url: String::new(),
                quantity: 1,
                stock_limit: 1,
            },
        ]
    }

    #[test]
    fn message_numbers_lines_and_totals() {
        let lines = lines();
        let message = format_order_message(&lines, &compute_totals(&lines));

        assert!(message.starts_with("*Order*\n\n1. *Whey 900g*\n   Brand: Buffalo\n"));
        assert!(message.contains("   Quantity: 2\n   Unit price: 99.90\n   Subtotal: 199.80\n"));
        assert!(message.contains("2. *Creatine*"));
        assert!(message.contains("*Total: 244.80*"));
    }

    #[test]
    fn link_encodes_message_and_strips_recipient() {
        let lines = lines();
        let handoff = build_handoff(&lines, &compute_totals(&lines), "+55 (11) 99999-9999");
        let prefix = "https://wa.me/5511999999999?text=";
        assert!(handoff.url.starts_with(prefix));

        let encoded = &handoff.url[prefix.len()..];
        assert!(!encoded.contains('\n'));
        assert!(!encoded.contains(' '));
        let decoded: String = form_urlencoded::parse(format!("text={encoded}").as_bytes())
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(decoded, handoff.message);
    }
}
