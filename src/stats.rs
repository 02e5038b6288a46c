//! Admin dashboard figures, computed from one listing of each store.

use crate::clients::{LedgerClient, ProductClient, UserClient};
use crate::model::{Action, ActionFilter, ActionKind, ProductFilter, User, UserFilter, UserId};
use actor_framework::ActorClient;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

const TOP: usize = 5;
const RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSales {
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub name: String,
    /// Line items naming the product, across purchases and quotes.
    pub total_sales: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopClient {
    pub name: String,
    pub total_purchases: usize,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_actions: usize,
    pub recent_sales: RecentSales,
    pub top_products: Vec<TopProduct>,
    pub top_clients: Vec<TopClient>,
}

impl DashboardStats {
    pub async fn collect(
        users: &UserClient,
        products: &ProductClient,
        ledger: &LedgerClient,
    ) -> Result<Self, String> {
        let users = users
            .list(UserFilter::default())
            .await
            .map_err(|e| e.to_string())?;
        let total_products = products
            .list(ProductFilter::default())
            .await
            .map_err(|e| e.to_string())?
            .len();
        let actions = ledger
            .list(ActionFilter::default())
            .await
            .map_err(|e| e.to_string())?;
        Ok(Self::compute(&users, total_products, &actions, Utc::now()))
    }

    /// Ties are broken by name so the ranking is stable.
    pub fn compute(
        users: &[User],
        total_products: usize,
        actions: &[Action],
        now: DateTime<Utc>,
    ) -> Self {
        let since = now - Duration::days(RECENT_DAYS);
        let recent: Vec<&Action> = actions
            .iter()
            .filter(|action| action.kind == ActionKind::Purchase && action.created_at >= since)
            .collect();
        let recent_sales = RecentSales {
            total: recent.iter().map(|action| action.total_price).sum(),
            count: recent.len(),
        };

        let mut per_product: HashMap<&str, usize> = HashMap::new();
        for line in actions.iter().flat_map(|action| &action.lines) {
            *per_product.entry(line.product_name.as_str()).or_default() += 1;
        }
        let mut top_products: Vec<TopProduct> = per_product
            .into_iter()
            .map(|(name, total_sales)| TopProduct {
                name: name.to_string(),
                total_sales,
            })
            .collect();
        top_products.sort_by(|a, b| b.total_sales.cmp(&a.total_sales).then(a.name.cmp(&b.name)));
        top_products.truncate(TOP);

        let names: HashMap<UserId, &str> = users
            .iter()
            .map(|user| (user.id, user.full_name.as_str()))
            .collect();
        let mut per_client: HashMap<UserId, (usize, Decimal)> = HashMap::new();
        for action in actions {
            let entry = per_client.entry(action.client).or_default();
            entry.0 += 1;
            entry.1 += action.total_price;
        }
        let mut top_clients: Vec<TopClient> = per_client
            .into_iter()
            .map(|(client, (total_purchases, total_spent))| TopClient {
                name: names
                    .get(&client)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| client.to_string()),
                total_purchases,
                total_spent,
            })
            .collect();
        top_clients.sort_by(|a, b| {
            b.total_purchases
                .cmp(&a.total_purchases)
                .then(a.name.cmp(&b.name))
        });
        top_clients.truncate(TOP);

        Self {
            total_users: users.len(),
            total_products,
            total_actions: actions.len(),
            recent_sales,
            top_products,
            top_clients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn user(id: u32, name: &str) -> User {
        User {
            id: UserId(id),
            email: format!("u{id}@shop.mg"),
            full_name: name.into(),
            role: Role::Client,
            account_type: AccountType::Individual,
            phone: String::new(),
            address: String::new(),
            company: CompanyNumbers::default(),
            code: format!("client-{id}"),
            active: true,
            password_hash: String::new(),
        }
    }

    fn action(id: u32, kind: ActionKind, client: u32, days_ago: i64, products: &[&str]) -> Action {
        let lines: Vec<LineItem> = products
            .iter()
            .map(|name| LineItem {
                product: ProductId(1),
                product_name: name.to_string(),
                quantity: 1,
                unit_price: Decimal::from(100),
                sub_total: Decimal::from(100),
                validity: Validity::OneYear,
            })
            .collect();
        Action {
            id: ActionId(id),
            kind,
            code: format!("{}-{id}", kind.label()),
            total_price: Decimal::from(100 * lines.len() as i64),
            agreed_price: None,
            created_at: Utc::now() - Duration::days(days_ago),
            client: UserId(client),
            seller: None,
            payment_method: PaymentMethodId(1),
            delivered: false,
            paid: false,
            lines,
            allocation: Allocation::new(),
        }
    }

    #[test]
    fn test_dashboard_aggregates() {
        let users = vec![user(1, "Hery"), user(2, "Vola")];
        let actions = vec![
            action(1, ActionKind::Purchase, 1, 2, &["Office", "Antivirus"]),
            action(2, ActionKind::Purchase, 1, 45, &["Office"]),
            action(3, ActionKind::Quote, 2, 1, &["Office"]),
            action(4, ActionKind::Purchase, 2, 10, &["Windows"]),
        ];

        let stats = DashboardStats::compute(&users, 7, &actions, Utc::now());
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_products, 7);
        assert_eq!(stats.total_actions, 4);
        // Quotes and purchases older than 30 days are left out.
        assert_eq!(
            stats.recent_sales,
            RecentSales {
                total: Decimal::from(300),
                count: 2
            }
        );
        assert_eq!(stats.top_products[0].name, "Office");
        assert_eq!(stats.top_products[0].total_sales, 3);
        assert_eq!(
            stats
                .top_products
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Office", "Antivirus", "Windows"]
        );
        assert_eq!(
            stats.top_clients,
            vec![
                TopClient {
                    name: "Hery".into(),
                    total_purchases: 2,
                    total_spent: Decimal::from(300),
                },
                TopClient {
                    name: "Vola".into(),
                    total_purchases: 2,
                    total_spent: Decimal::from(200),
                },
            ]
        );
    }

    #[test]
    fn test_rankings_keep_five() {
        let users: Vec<User> = (1..=7).map(|id| user(id, &format!("C{id}"))).collect();
        let actions: Vec<Action> = (1..=7)
            .map(|id| action(id, ActionKind::Purchase, id, 0, &[format!("P{id}").as_str()]))
            .collect();
        let stats = DashboardStats::compute(&users, 7, &actions, Utc::now());
        assert_eq!(stats.top_products.len(), 5);
        assert_eq!(stats.top_clients.len(), 5);
        assert_eq!(stats.top_clients[0].name, "C1");
    }
}
