use std::fmt;

use super::step::{Progress, Step};

/// The side of the deal the signed in member is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Seller,
    Buyer,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Seller => "Seller",
            Role::Buyer => "Buyer",
        }
    }

    /// Member area the transaction is shown under
    pub fn area_path(self) -> &'static str {
        match self {
            Role::Seller => "/member/transactions/sell",
            Role::Buyer => "/member/transactions/buy",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Accept,
    Reject,
    Pay,
    Ship,
    ConfirmDelivery,
    DeliverDigital,
    Complete,
    Dispute,
    RequestCancellation,
    Help,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::Accept,
        Action::Reject,
        Action::Pay,
        Action::Ship,
        Action::ConfirmDelivery,
        Action::DeliverDigital,
        Action::Complete,
        Action::Dispute,
        Action::RequestCancellation,
        Action::Help,
    ];

    /// Path segment the action is posted to
    pub fn slug(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Reject => "reject",
            Action::Pay => "pay",
            Action::Ship => "ship",
            Action::ConfirmDelivery => "confirm-delivery",
            Action::DeliverDigital => "deliver",
            Action::Complete => "complete",
            Action::Dispute => "dispute",
            Action::RequestCancellation => "cancel",
            Action::Help => "help",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Accept => "Accept",
            Action::Reject => "Reject",
            Action::Pay => "Pay now",
            Action::Ship => "Ship",
            Action::ConfirmDelivery => "Confirm delivery",
            Action::DeliverDigital => "Deliver",
            Action::Complete => "Complete",
            Action::Dispute => "Dispute",
            Action::RequestCancellation => "Request cancellation",
            Action::Help => "Help",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.slug() == slug)
    }
}

///
/// Actions offered to `role` at the given progress, in the order the
/// buttons are shown.
///
pub fn available_actions(role: Role, progress: Progress) -> Vec<Action> {
    let mut actions = match (role, progress.step()) {
        (Role::Seller, Some(Step::ReadyToShip)) => vec![Action::Ship],
        (Role::Seller, Some(Step::InTransit)) => vec![Action::ConfirmDelivery],
        (Role::Seller, Some(Step::ReadyForDelivery)) => vec![Action::DeliverDigital],
        (Role::Buyer, Some(Step::Offered)) => vec![Action::Accept, Action::Reject],
        (Role::Buyer, Some(Step::AwaitingPayment)) => vec![Action::Pay],
        (Role::Buyer, Some(Step::InTransit)) => vec![Action::ConfirmDelivery],
        (Role::Buyer, Some(Step::Delivered)) => vec![Action::Complete, Action::Dispute],
        _ => vec![],
    };
    if progress.is_running() {
        actions.push(Action::RequestCancellation);
    }
    actions.push(Action::Help);
    actions
}

pub fn is_allowed(role: Role, progress: Progress, action: Action) -> bool {
    available_actions(role, progress).contains(&action)
}
