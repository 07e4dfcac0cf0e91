use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CondoPago API",
        version = "1.0.0",
        description = "Backend API para CondoPago - facturación y conciliación de pagos de condominios",
        contact(
            name = "CondoPago Team",
            email = "soporte@condopago.com.ve"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "admin", description = "Operaciones administrativas: cargos, morosidad, cierres y tasas"),
        (name = "payments", description = "Reportes de pago de los propietarios"),
        (name = "movements", description = "Revisión y decisión de movimientos bancarios"),
        (name = "owners", description = "Resumen financiero del propietario"),
        (name = "rates", description = "Tasa de cambio vigente")
    ),
    paths(
        // Admin
        crate::api::admin::generate_charges,
        crate::api::admin::classify_delinquency,
        crate::api::admin::close_month,
        crate::api::admin::get_dashboard,
        crate::api::admin::upsert_rate,
        // Payments
        crate::api::payments::submit_payment,
        crate::api::payments::get_history,
        crate::api::payments::get_pending,
        // Movements
        crate::api::movements::list_pending,
        crate::api::movements::get_movement,
        crate::api::movements::approve_movement,
        crate::api::movements::reject_movement,
        // Owners
        crate::api::owners::get_my_summary,
        crate::api::owners::get_summary_by_user,
        // Rates
        crate::api::rates::get_current_rate,
    ),
    components(
        schemas(
            // Charges & delinquency
            crate::models::GenerateChargesRequest,
            crate::models::GenerateChargesResponse,
            crate::models::ClassifyDelinquencyRequest,
            crate::models::ClassifyDelinquencyResponse,
            // Closures
            crate::models::CloseMonthRequest,
            crate::models::MonthClosure,
            // Rates
            crate::models::UpsertRateRequest,
            crate::models::ExchangeRate,
            // Payments & movements
            crate::models::SubmitPaymentRequest,
            crate::models::SubmitPaymentResponse,
            crate::models::RejectMovementRequest,
            crate::models::RejectMovementResponse,
            crate::models::ApproveMovementResponse,
            crate::models::MovementDetailResponse,
            crate::models::Movement,
            crate::models::MovementStatus,
            crate::models::Receipt,
            crate::models::ReceiptCategory,
            crate::models::PendingMovementRow,
            crate::models::PaymentHistoryRow,
            crate::models::PaymentHistoryQuery,
            crate::api::movements::PendingQuery,
            crate::api::admin::DashboardQuery,
            // Owner summary
            crate::models::Owner,
            crate::models::Unit,
            crate::models::Debt,
            crate::models::OwnerSummaryResponse,
            crate::models::DebtTotalsView,
            crate::models::MoneyTotals,
            crate::models::Equivalents,
            crate::models::CondominiumTotals,
            // Dashboard
            crate::models::DashboardResponse,
            crate::models::DebtAggregate,
            crate::models::PaymentsAggregate,
            crate::models::TopDebtorRow,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
