use dashmap::DashMap;
use leadcard_app::application::LeadCard;
use leadcard_errors::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

struct CardEntry {
    card: Arc<LeadCard>,
    last_touched: Instant,
}

/// Live card sessions. A card lasts until it is removed or sits idle past
/// the sweeper's limit.
#[derive(Clone, Default)]
pub struct CardRegistry {
    cards: Arc<DashMap<Uuid, CardEntry>>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, card: LeadCard) -> (Uuid, Arc<LeadCard>) {
        let id = Uuid::new_v4();
        let card = Arc::new(card);
        self.cards.insert(
            id,
            CardEntry {
                card: card.clone(),
                last_touched: Instant::now(),
            },
        );
        (id, card)
    }

    /// Looks a card up and marks it as recently used.
    pub fn get(&self, id: Uuid) -> Result<Arc<LeadCard>, AppError> {
        let mut entry = self
            .cards
            .get_mut(&id)
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))?;
        entry.last_touched = Instant::now();
        Ok(entry.card.clone())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.cards
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Drops every card untouched for longer than `max_idle`, returning how
    /// many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.cards.len();
        let now = Instant::now();
        self.cards
            .retain(|_, entry| now.duration_since(entry.last_touched) <= max_idle);
        before.saturating_sub(self.cards.len())
    }

    pub fn spawn_sweeper(&self, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::info!(
                        "Evicted {} idle cards ({} live)",
                        evicted,
                        registry.len()
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadcard_app::application::CardServices;
    use leadcard_app::domain::RecordFields;
    use leadcard_app::infrastructure::scripted::ScriptedVoteService;

    fn card(ticket: &str) -> LeadCard {
        let services = CardServices {
            vote_service: Arc::new(ScriptedVoteService::new()),
            clipboard: None,
            share_target: None,
            origin: "https://leads.example.org".to_string(),
        };
        LeadCard::new(RecordFields::new(ticket), None, &services)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_cards_are_evicted_and_touched_cards_survive() {
        let registry = CardRegistry::new();
        let (idle, _) = registry.insert(card("T-1"));
        let (busy, _) = registry.insert(card("T-2"));

        tokio::time::advance(Duration::from_secs(40)).await;
        registry.get(busy).unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)), 1);
        assert!(registry.get(idle).is_err());
        assert!(registry.get(busy).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_its_interval() {
        let registry = CardRegistry::new();
        registry.insert(card("T-3"));
        let sweeper = registry.spawn_sweeper(Duration::from_secs(10), Duration::from_secs(15));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(registry.len(), 0);

        sweeper.abort();
    }
}
