/// The subscribe/unsubscribe badge. There is exactly one per grid; the grid
/// moves it between cells instead of creating new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionOverlay {
    media_name: String,
    is_subscribed: bool,
}

impl SubscriptionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites the badge contents. Returns whether anything changed, so a
    /// repeated call with the same arguments is observable as a no-op.
    pub fn update_view(&mut self, media_name: &str, is_subscribed: bool) -> bool {
        if self.media_name == media_name && self.is_subscribed == is_subscribed {
            return false;
        }
        self.media_name.clear();
        self.media_name.push_str(media_name);
        self.is_subscribed = is_subscribed;
        true
    }

    pub fn media_name(&self) -> &str {
        &self.media_name
    }

    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    pub fn label(&self) -> &'static str {
        if self.is_subscribed {
            "Unsubscribe"
        } else {
            "Subscribe"
        }
    }
}
