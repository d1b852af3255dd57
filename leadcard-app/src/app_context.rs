use crate::application::{CardServices, Clipboard, LeadCard, ShareTarget};
use crate::domain::RecordFields;
use crate::infrastructure::graphql::GraphqlTicketClient;
use crate::infrastructure::share::WebhookShareTarget;
use crate::AppConfig;
use leadcard_errors::AppError;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub services: CardServices,
}

impl AppContext {
    pub fn new(services: CardServices) -> Self {
        Self { services }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let vote_service =
            GraphqlTicketClient::new(config.graphql_endpoint.clone(), config.http_timeout)?;

        let share_target: Option<Arc<dyn ShareTarget>> = match &config.share_webhook_url {
            Some(url) => {
                tracing::info!("Share target enabled: {}", url);
                let target = WebhookShareTarget::new(url.clone(), config.http_timeout)?;
                Some(Arc::new(target) as Arc<dyn ShareTarget>)
            }
            None => {
                tracing::info!("No SHARE_WEBHOOK_URL set, sharing is unavailable");
                None
            }
        };

        tracing::info!("Ticket votes go to {}", config.graphql_endpoint);
        Ok(Self::new(CardServices {
            vote_service: Arc::new(vote_service),
            clipboard: shared_clipboard(),
            share_target,
            origin: config.public_origin.clone(),
        }))
    }

    pub fn open_card(&self, record: RecordFields, initial_count: Option<&Value>) -> LeadCard {
        LeadCard::new(record, initial_count, &self.services)
    }
}

#[cfg(feature = "system-clipboard")]
fn shared_clipboard() -> Option<Arc<dyn Clipboard>> {
    use crate::infrastructure::clipboard::SystemClipboard;
    tracing::info!("Copies go to the system clipboard");
    Some(Arc::new(SystemClipboard))
}

/// Without a system clipboard each card keeps its own copied text.
#[cfg(not(feature = "system-clipboard"))]
fn shared_clipboard() -> Option<Arc<dyn Clipboard>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(share_webhook_url: Option<&str>) -> AppConfig {
        AppConfig {
            graphql_endpoint: url::Url::parse("http://127.0.0.1:4000/graphql").unwrap(),
            public_origin: "https://leads.example.org".to_string(),
            share_webhook_url: share_webhook_url.map(|u| url::Url::parse(u).unwrap()),
            http_timeout: Duration::from_secs(1),
            bind_addr: "127.0.0.1:0".to_string(),
            card_idle_timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_share_target_follows_config() {
        let without = AppContext::from_config(&config(None)).unwrap();
        assert!(without.services.share_target.is_none());

        let with = AppContext::from_config(&config(Some("https://hooks.example.org/share"))).unwrap();
        assert!(with.services.share_target.is_some());
        assert_eq!(with.services.origin, "https://leads.example.org");
    }

    #[test]
    fn test_clipboard_follows_feature() {
        let ctx = AppContext::from_config(&config(None)).unwrap();
        assert_eq!(
            ctx.services.clipboard.is_some(),
            cfg!(feature = "system-clipboard")
        );
    }

    #[test]
    fn test_open_card_normalizes_initial_count() {
        let ctx = AppContext::from_config(&config(None)).unwrap();

        let card = ctx.open_card(RecordFields::new("T-1"), Some(&serde_json::json!("not a number")));

        assert_eq!(card.snapshot().vote.count, 0);
        assert_eq!(card.snapshot().ticket_id, "T-1");
    }
}
