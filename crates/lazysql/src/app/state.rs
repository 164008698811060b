use crate::config::Host;
use crate::ui::ListItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Hosts,
    Database,
}

/// Focused pane on the database screen, in Tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Databases,
    Tables,
    History,
    Query,
    Grid,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Databases,
        Focus::Tables,
        Focus::History,
        Focus::Query,
        Focus::Grid,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_list(self) -> bool {
        matches!(self, Focus::Databases | Focus::Tables | Focus::History)
    }
}

/// Focused pane on the hosts screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostsFocus {
    List,
    Form,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl DbStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DbStatus::Disconnected => "DISCONNECTED",
            DbStatus::Connecting => "CONNECTING",
            DbStatus::Connected => "CONNECTED",
        }
    }
}

/// Entry of the hosts list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostChoice {
    New,
    Saved(Host),
}

impl ListItem for HostChoice {
    fn display(&self) -> String {
        match self {
            HostChoice::New => "<< New host >>".to_string(),
            HostChoice::Saved(host) => host.name.clone(),
        }
    }

    fn same_item(&self, other: &Self) -> bool {
        match (self, other) {
            (HostChoice::New, HostChoice::New) => true,
            (HostChoice::Saved(a), HostChoice::Saved(b)) => a.same_item(b),
            _ => false,
        }
    }
}
