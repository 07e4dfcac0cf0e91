pub mod closure;
pub mod condominium;
pub mod debt;
pub mod movement;
pub mod rate;
pub mod summary;
pub mod unit;

pub use closure::{CloseMonthRequest, MonthClosure};
pub use condominium::Condominium;
pub use debt::{
    ClassifyDelinquencyRequest, ClassifyDelinquencyResponse, Currency, Debt, DueDate,
    GenerateChargesRequest, GenerateChargesResponse,
};
pub use movement::{
    ApproveMovementResponse, Movement, MovementDetailResponse, MovementStatus,
    PaymentHistoryQuery, PaymentHistoryRow, PendingMovementRow, Receipt, ReceiptCategory,
    RejectMovementRequest, RejectMovementResponse, SubmitPaymentRequest, SubmitPaymentResponse,
};
pub use rate::{ExchangeRate, UpsertRateRequest};
pub use summary::{
    CondominiumTotals, DashboardResponse, DebtAggregate, DebtTotalsRow, DebtTotalsView,
    Equivalents, MoneyTotals, OwnerSummaryResponse, PaymentsAggregate, TopDebtorRow,
};
pub use unit::{Owner, Unit};
