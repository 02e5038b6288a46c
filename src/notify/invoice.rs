//! Invoice and quote documents: a plain-text body plus the same text as a PDF attachment.

use super::pdf::render_pdf;
use super::{Attachment, Email, NotifyError};
use crate::model::{Action, ActionKind, Allocation, User};

/// Renders the document mailed to `client` for `action`.
///
/// Prices come from the action's line items; keys come from `allocation`, which for a quote
/// holds placeholders.
pub fn render_invoice(
    action: &Action,
    client: &User,
    allocation: &Allocation,
    currency: &str,
    from: &str,
) -> Result<Email, NotifyError> {
    let (title, subject) = match action.kind {
        ActionKind::Purchase => ("INVOICE", format!("Your invoice {}", action.code)),
        ActionKind::Quote => ("QUOTE", format!("Your quote {}", action.code)),
    };

    let mut lines = vec![
        title.to_string(),
        String::new(),
        format!("Client: {}", client.full_name),
        format!("Email: {}", client.email),
        format!("Date: {}", action.created_at.format("%Y-%m-%d %H:%M")),
        format!("Action: {}", action.code),
        String::new(),
        "Products:".to_string(),
    ];
    lines.extend(action.lines.iter().map(|line| {
        format!(
            "- {} x{} = {} {currency}",
            line.product_name, line.quantity, line.sub_total
        )
    }));
    lines.push(String::new());
    lines.push(format!("Total: {} {currency}", action.total_price));
    if let Some(agreed) = action.agreed_price {
        lines.push(format!("Agreed price: {agreed} {currency}"));
    }

    lines.push(String::new());
    lines.push("Keys:".to_string());
    for (product, entries) in allocation {
        lines.push(format!("{product}:"));
        lines.extend(entries.iter().map(|entry| {
            format!(
                "  {} {} ({})",
                entry.display_code, entry.secret_payload, entry.validity_label
            )
        }));
    }

    let mut body = lines.join("\n");
    body.push('\n');

    Ok(Email {
        from: from.to_string(),
        to: client.email.clone(),
        subject,
        body,
        attachments: vec![Attachment {
            filename: format!("{}.pdf", action.code),
            content_type: "application/pdf".into(),
            content: render_pdf(&lines)?,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn client() -> User {
        User {
            id: UserId(1),
            email: "hery@shop.mg".into(),
            full_name: "Hery Rabe".into(),
            role: Role::Client,
            account_type: AccountType::Individual,
            phone: String::new(),
            address: String::new(),
            company: CompanyNumbers::default(),
            code: "client-1".into(),
            active: true,
            password_hash: String::new(),
        }
    }

    fn action(kind: ActionKind) -> Action {
        Action {
            id: ActionId(4),
            kind,
            code: format!("{}-4", kind.label()),
            total_price: Decimal::from(250_000),
            agreed_price: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            client: UserId(1),
            seller: Some(UserId(2)),
            payment_method: PaymentMethodId(1),
            delivered: false,
            paid: false,
            lines: vec![LineItem {
                product: ProductId(3),
                product_name: "Office Pro".into(),
                quantity: 2,
                unit_price: Decimal::from(125_000),
                sub_total: Decimal::from(250_000),
                validity: Validity::OneYear,
            }],
            allocation: Allocation::new(),
        }
    }

    #[test]
    fn test_purchase_invoice_lists_lines_and_keys() {
        let mut allocation = Allocation::new();
        allocation.insert(
            "Office Pro".into(),
            vec![AllocationEntry {
                key_id: Some(KeyId(9)),
                secret_payload: "AAAA-BBBB".into(),
                display_code: "Office Pro-9".into(),
                validity_label: Validity::OneYear,
            }],
        );

        let email = render_invoice(
            &action(ActionKind::Purchase),
            &client(),
            &allocation,
            "MGA",
            "shop@keyshop.mg",
        )
        .unwrap();
        assert_eq!(email.to, "hery@shop.mg");
        assert_eq!(email.subject, "Your invoice ACHAT-4");
        assert!(email.body.starts_with("INVOICE\n"));
        assert!(email.body.contains("Date: 2026-03-01 09:30\n"));
        assert!(email.body.contains("- Office Pro x2 = 250000 MGA\n"));
        assert!(email.body.contains("Total: 250000 MGA\n"));
        assert!(email.body.contains("  Office Pro-9 AAAA-BBBB (1 year)\n"));
        assert!(!email.body.contains("Agreed price"));

        assert_eq!(email.attachments.len(), 1);
        let invoice = &email.attachments[0];
        assert_eq!(invoice.filename, "ACHAT-4.pdf");
        assert_eq!(invoice.content_type, "application/pdf");
        assert!(invoice.content.starts_with(b"%PDF"));
    }

    #[test]
    fn test_quote_shows_placeholders() {
        let mut allocation = Allocation::new();
        allocation.insert(
            "Office Pro".into(),
            vec![AllocationEntry::placeholder(Validity::OneYear); 2],
        );

        let email = render_invoice(
            &action(ActionKind::Quote),
            &client(),
            &allocation,
            "MGA",
            "shop@keyshop.mg",
        )
        .unwrap();
        assert_eq!(email.subject, "Your quote DEVIS-4");
        assert_eq!(email.attachments[0].filename, "DEVIS-4.pdf");
        assert_eq!(
            email
                .body
                .matches("  N/A to be assigned at purchase (1 year)\n")
                .count(),
            2
        );
    }
}
