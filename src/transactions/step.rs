use crate::{
    models::present,
    views::models::{Stage, StageState, Stepper},
};

use super::models::{Transaction, TransactionStatus, TransactionType};

/// Where a running transaction stands, numbered as shown to members
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Offered,
    AwaitingPayment,
    ReadyToShip,
    InTransit,
    ReadyForDelivery,
    Delivered,
    Completed,
}

impl Step {
    pub const ALL: &'static [Step] = &[
        Step::Offered,
        Step::AwaitingPayment,
        Step::ReadyToShip,
        Step::InTransit,
        Step::ReadyForDelivery,
        Step::Delivered,
        Step::Completed,
    ];

    pub fn number(self) -> u8 {
        match self {
            Step::Offered => 1,
            Step::AwaitingPayment => 2,
            Step::ReadyToShip => 3,
            Step::InTransit => 4,
            Step::ReadyForDelivery => 5,
            Step::Delivered => 6,
            Step::Completed => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Offered => "Offered",
            Step::AwaitingPayment => "Waiting for payment",
            Step::ReadyToShip => "Ready to ship",
            Step::InTransit => "In transit",
            Step::ReadyForDelivery => "Ready for delivery",
            Step::Delivered => "Delivered, awaiting verification",
            Step::Completed => "Completed",
        }
    }

    /// The steps a transaction of this type goes through
    pub fn path(transaction_type: Option<TransactionType>) -> Vec<Step> {
        let skipped = match transaction_type {
            Some(TransactionType::Digital) => [Step::ReadyToShip, Step::InTransit].as_slice(),
            _ => [Step::ReadyForDelivery].as_slice(),
        };
        Step::ALL.iter().copied().filter(|s| !skipped.contains(s)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Canceled,
    Rejected,
    Disputed,
}

impl Terminal {
    pub fn label(self) -> &'static str {
        match self {
            Terminal::Canceled => "Canceled",
            Terminal::Rejected => "Rejected",
            Terminal::Disputed => "Disputed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Progress {
    Step(Step),
    Terminal(Terminal),
}

impl Progress {
    ///
    /// Derives the progress of a transaction from its status and the
    /// fields set so far. Blank strings count as unset. A missing type
    /// follows the physical path.
    ///
    pub fn of(tx: &Transaction) -> Self {
        let status = tx.status.unwrap_or(TransactionStatus::Pending);
        let digital = tx.is_digital();
        let paid = present(&tx.payment_id).is_some();
        let shipped = present(&tx.shipping_number).is_some();
        let delivered = tx.delivered_at.is_some();

        match status {
            TransactionStatus::Pending => Progress::Step(Step::Offered),
            TransactionStatus::Accepted if !paid => Progress::Step(Step::AwaitingPayment),
            TransactionStatus::Accepted if !digital && !shipped => Progress::Step(Step::ReadyToShip),
            TransactionStatus::Accepted if delivered => Progress::Step(Step::Delivered),
            TransactionStatus::Accepted if digital => Progress::Step(Step::ReadyForDelivery),
            TransactionStatus::Accepted => Progress::Step(Step::InTransit),
            TransactionStatus::Completed => Progress::Step(Step::Completed),
            TransactionStatus::Canceled => Progress::Terminal(Terminal::Canceled),
            TransactionStatus::Rejected => Progress::Terminal(Terminal::Rejected),
            TransactionStatus::Disputed => Progress::Terminal(Terminal::Disputed),
        }
    }

    pub fn step(self) -> Option<Step> {
        match self {
            Progress::Step(step) => Some(step),
            Progress::Terminal(_) => None,
        }
    }

    /// Step number, `0` for a terminal transaction
    pub fn number(self) -> u8 {
        self.step().map(Step::number).unwrap_or(0)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Progress::Step(step) if step != Step::Completed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Progress::Step(step) => step.label(),
            Progress::Terminal(terminal) => terminal.label(),
        }
    }

    pub fn stepper(self, transaction_type: Option<TransactionType>) -> Stepper {
        let current = self.number();
        let stages = Step::path(transaction_type)
            .into_iter()
            .map(|step| Stage {
                number: step.number(),
                label: step.label(),
                state: match step.number() {
                    _ if current == 0 => StageState::Todo,
                    n if n < current => StageState::Done,
                    n if n == current => StageState::Current,
                    _ => StageState::Todo,
                },
            })
            .collect();

        let terminal = match self {
            Progress::Terminal(terminal) => Some(terminal.label()),
            Progress::Step(_) => None,
        };
        Stepper { stages, terminal }
    }
}
