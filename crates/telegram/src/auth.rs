use price_alert_core::RecipientId;
use std::collections::HashSet;

/// Allow-list of user ids. An empty list authorizes nobody.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    allowed: HashSet<RecipientId>,
}

impl Authorizer {
    #[must_use]
    pub fn new(user_ids: impl IntoIterator<Item = RecipientId>) -> Self {
        Self {
            allowed: user_ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_authorized(&self, user_id: RecipientId) -> bool {
        self.allowed.contains(&user_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
